//! HTTP endpoint tests for the PDF toolkit server

#[cfg(test)]
mod api_tests {
    //! HTTP endpoint integration tests using axum-test

    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use pdftoolkit_core::archive::open_package;
    use pdftoolkit_core::convert::docx::write_docx;
    use pdftoolkit_core::convert::extract::page_texts;
    use pdftoolkit_core::convert::layout::render_text_pdf;
    use pdftoolkit_core::{get_page_count, Dispatcher};
    use pretty_assertions::assert_eq;
    use std::io::Read;

    use crate::{app, AppState};

    /// Create a test server with the full router; the temp dir must outlive it
    fn create_test_server() -> (tempfile::TempDir, TestServer) {
        create_test_server_with_limit(50 * 1024 * 1024)
    }

    fn create_test_server_with_limit(max_upload_bytes: usize) -> (tempfile::TempDir, TestServer) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(Dispatcher::new(dir.path()));
        let server = TestServer::new(app(state, max_upload_bytes)).unwrap();
        (dir, server)
    }

    fn pdf_part(text: &str, name: &str) -> Part {
        Part::bytes(render_text_pdf(&[text]).unwrap())
            .file_name(name)
            .mime_type("application/pdf")
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(6, 4, image::Rgb([200, 30, 30]));
        let mut buffer = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn error_code(response: &axum_test::TestResponse) -> String {
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], false);
        json["code"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_returns_200() {
        let (_dir, server) = create_test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "pdftoolkit-server");
    }

    #[tokio::test]
    async fn test_index_serves_menu() {
        let (_dir, server) = create_test_server();
        let response = server.get("/").await;
        response.assert_status_ok();
        assert!(response.text().contains("Convert To PDF"));
    }

    #[tokio::test]
    async fn test_operations_lists_menu_in_order() {
        let (_dir, server) = create_test_server();
        let response = server.get("/api/operations").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["count"], 5);
        let labels: Vec<&str> = json["operations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|op| op["label"].as_str().unwrap())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Merge PDF",
                "Compress PDF",
                "Split PDF",
                "Convert From PDF",
                "Convert To PDF"
            ]
        );
        assert_eq!(json["operations"][0]["multiple_files"], true);
        assert_eq!(json["operations"][3]["formats"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_merge_keeps_upload_order() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new()
            .add_part("files", pdf_part("Alpha", "a.pdf"))
            .add_part("files", pdf_part("Bravo", "b.pdf"));

        let response = server.post("/api/merge").multipart(form).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "application/pdf");
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"merged_output.pdf\""
        );
        let pages = page_texts(response.as_bytes()).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("Alpha"));
        assert!(pages[1].contains("Bravo"));
    }

    #[tokio::test]
    async fn test_merge_without_files_is_a_warning() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new().add_text("note", "nothing attached");

        let response = server.post("/api/merge").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "NO_INPUT");
    }

    #[tokio::test]
    async fn test_merge_rejects_wrong_extension() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new()
            .add_part("files", pdf_part("Alpha", "a.pdf"))
            .add_part("files", Part::bytes(b"hello".to_vec()).file_name("notes.txt"));

        let response = server.post("/api/merge").multipart(form).await;

        response.assert_status_bad_request();
        assert_eq!(error_code(&response), "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_compress_returns_pdf() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new().add_part("file", pdf_part("Compress me", "in.pdf"));

        let response = server.post("/api/compress").multipart(form).await;

        response.assert_status_ok();
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"compressed_output.pdf\""
        );
        assert_eq!(get_page_count(response.as_bytes()).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_compress_rejects_corrupt_pdf() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"%PDF-1.7 garbage".to_vec()).file_name("broken.pdf"),
        );

        let response = server.post("/api/compress").multipart(form).await;

        response.assert_status_bad_request();
        assert_eq!(error_code(&response), "INVALID_DOCUMENT");
    }

    #[tokio::test]
    async fn test_split_returns_zip_of_pages() {
        let (_dir, server) = create_test_server();
        let pdf = render_text_pdf(&["one", "two", "three"]).unwrap();
        let form = MultipartForm::new().add_part("file", Part::bytes(pdf).file_name("three.pdf"));

        let response = server.post("/api/split").multipart(form).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "application/zip");
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"split_output.zip\""
        );

        let body = response.as_bytes().to_vec();
        let mut archive = open_package(&body).unwrap();
        assert_eq!(archive.len(), 3);
        for (index, expected) in ["one", "two", "three"].iter().enumerate() {
            let mut page = Vec::new();
            archive
                .by_name(&format!("{}_output.pdf", index))
                .unwrap()
                .read_to_end(&mut page)
                .unwrap();
            assert!(page_texts(&page).unwrap()[0].contains(expected));
        }
    }

    #[tokio::test]
    async fn test_split_requires_exactly_one_file() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new()
            .add_part("file", pdf_part("one", "a.pdf"))
            .add_part("file", pdf_part("two", "b.pdf"));

        let response = server.post("/api/split").multipart(form).await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_convert_from_pdf_to_word() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new()
            .add_text("format", "word")
            .add_part("file", pdf_part("Meeting notes", "notes.pdf"));

        let response = server.post("/api/convert-from-pdf").multipart(form).await;

        response.assert_status_ok();
        assert_eq!(
            response.header("content-type"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"converted_output.docx\""
        );
        let paragraphs =
            pdftoolkit_core::convert::docx::read_paragraphs(response.as_bytes()).unwrap();
        assert!(paragraphs.iter().any(|p| p.contains("Meeting notes")));
    }

    #[tokio::test]
    async fn test_convert_from_pdf_requires_format() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new().add_part("file", pdf_part("x", "x.pdf"));

        let response = server.post("/api/convert-from-pdf").multipart(form).await;

        response.assert_status_bad_request();
        assert_eq!(error_code(&response), "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_convert_from_pdf_rejects_unknown_format() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new()
            .add_text("format", "epub")
            .add_part("file", pdf_part("x", "x.pdf"));

        let response = server.post("/api/convert-from-pdf").multipart(form).await;

        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(error_code(&response), "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_convert_text_pdf_to_image_reports_no_images() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new()
            .add_text("format", "image")
            .add_part("file", pdf_part("text only", "text.pdf"));

        let response = server.post("/api/convert-from-pdf").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "NO_IMAGES");
    }

    #[tokio::test]
    async fn test_image_roundtrip_through_pdf() {
        let (_dir, server) = create_test_server();
        let form = MultipartForm::new()
            .add_text("format", "image")
            .add_part("file", Part::bytes(png_bytes()).file_name("photo.png"));

        let response = server.post("/api/convert-to-pdf").multipart(form).await;
        response.assert_status_ok();
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"converted_output.pdf\""
        );
        let pdf = response.as_bytes().to_vec();
        assert_eq!(get_page_count(&pdf).unwrap(), 1);

        let form = MultipartForm::new()
            .add_text("format", "image")
            .add_part("file", Part::bytes(pdf).file_name("photo.pdf"));
        let response = server.post("/api/convert-from-pdf").multipart(form).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "image/png");
        let img = image::load_from_memory(response.as_bytes()).unwrap();
        assert_eq!((img.width(), img.height()), (6, 4));
    }

    #[tokio::test]
    async fn test_convert_to_pdf_infers_format_from_extension() {
        let (_dir, server) = create_test_server();
        let docx = write_docx(&["Inferred".to_string()]).unwrap();
        let form = MultipartForm::new().add_part("file", Part::bytes(docx).file_name("memo.docx"));

        let response = server.post("/api/convert-to-pdf").multipart(form).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "application/pdf");
        let pages = page_texts(response.as_bytes()).unwrap();
        assert!(pages[0].contains("Inferred"));
    }

    #[tokio::test]
    async fn test_convert_to_pdf_rejects_mismatched_extension() {
        let (_dir, server) = create_test_server();
        let docx = write_docx(&["Wrong".to_string()]).unwrap();
        let form = MultipartForm::new()
            .add_text("format", "excel")
            .add_part("file", Part::bytes(docx).file_name("memo.docx"));

        let response = server.post("/api/convert-to-pdf").multipart(form).await;

        response.assert_status_bad_request();
        assert_eq!(error_code(&response), "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_rejected() {
        let (_dir, server) = create_test_server_with_limit(1024);
        let form = MultipartForm::new()
            .add_part("file", Part::bytes(vec![b'x'; 64 * 1024]).file_name("big.pdf"));

        let response = server.post("/api/compress").multipart(form).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_code(&response), "PAYLOAD_TOO_LARGE");
    }
}

#[cfg(test)]
mod property_tests {
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use pdftoolkit_core::Dispatcher;
    use proptest::prelude::*;

    use crate::{app, AppState};

    /// Extensions no operation accepts
    fn foreign_extension() -> impl Strategy<Value = String> {
        "[a-z]{1,5}".prop_filter("Must not be a known extension", |ext| {
            pdftoolkit_core::DocumentFormat::from_extension(ext).is_none()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: uploads with a foreign extension never reach the handlers
        #[test]
        fn foreign_extensions_are_rejected(ext in foreign_extension()) {
            let status = tokio_test::block_on(async {
                let state = AppState::new(Dispatcher::default());
                let server = TestServer::new(app(state, 1024 * 1024)).unwrap();
                let part = Part::bytes(b"data".to_vec()).file_name(format!("upload.{}", ext));
                let form = MultipartForm::new().add_part("file", part);
                server.post("/api/compress").multipart(form).await.status_code()
            });
            prop_assert_eq!(status.as_u16(), 400);
        }
    }
}
