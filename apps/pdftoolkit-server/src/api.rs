//! API handlers for the PDF toolkit server
//!
//! Every operation endpoint takes a multipart upload and answers with the
//! result file as an attachment.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use pdftoolkit_core::{DocumentFormat, OperationSelection, ResultBuffer, UploadedFile};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::ui::INDEX_HTML;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pdftoolkit-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Operation list response
#[derive(Serialize)]
pub struct OperationListResponse {
    pub success: bool,
    pub operations: Vec<OperationInfo>,
    pub count: usize,
}

/// Menu entry for one operation
#[derive(Serialize)]
pub struct OperationInfo {
    pub label: &'static str,
    pub endpoint: String,
    pub multiple_files: bool,
    /// Accepted upload extensions; empty when they depend on `formats`
    pub extensions: Vec<&'static str>,
    /// Secondary format choices for conversions
    pub formats: Vec<FormatInfo>,
}

#[derive(Serialize)]
pub struct FormatInfo {
    pub format: DocumentFormat,
    pub label: &'static str,
    pub extensions: Vec<&'static str>,
}

/// Handler: GET /api/operations
pub async fn handle_list_operations() -> Json<OperationListResponse> {
    let formats = || -> Vec<FormatInfo> {
        DocumentFormat::CONVERTIBLE
            .iter()
            .map(|&format| FormatInfo {
                format,
                label: format.label(),
                extensions: format.extensions().to_vec(),
            })
            .collect()
    };
    let pdf_only = || DocumentFormat::Pdf.extensions().to_vec();

    let operations = vec![
        (OperationSelection::Merge, pdf_only(), Vec::new()),
        (OperationSelection::Compress, pdf_only(), Vec::new()),
        (OperationSelection::Split, pdf_only(), Vec::new()),
        (
            OperationSelection::ConvertFromPdf {
                target: DocumentFormat::Word,
            },
            pdf_only(),
            formats(),
        ),
        (
            OperationSelection::ConvertToPdf {
                source: DocumentFormat::Word,
            },
            Vec::new(),
            formats(),
        ),
    ]
    .into_iter()
    .map(|(selection, extensions, formats)| OperationInfo {
        label: selection.label(),
        endpoint: format!("/api/{}", selection.slug()),
        multiple_files: selection.accepts_multiple(),
        extensions,
        formats,
    })
    .collect::<Vec<_>>();

    let count = operations.len();
    Json(OperationListResponse {
        success: true,
        operations,
        count,
    })
}

/// Handler: POST /api/merge
pub async fn handle_merge(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let form = UploadForm::read(multipart).await?;
    let files = form.into_files(DocumentFormat::Pdf)?;
    run(state, OperationSelection::Merge, files).await
}

/// Handler: POST /api/compress
pub async fn handle_compress(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let form = UploadForm::read(multipart).await?;
    let files = form.into_files(DocumentFormat::Pdf)?;
    run(state, OperationSelection::Compress, files).await
}

/// Handler: POST /api/split
pub async fn handle_split(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let form = UploadForm::read(multipart).await?;
    let files = form.into_files(DocumentFormat::Pdf)?;
    run(state, OperationSelection::Split, files).await
}

/// Handler: POST /api/convert-from-pdf
pub async fn handle_convert_from_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let form = UploadForm::read(multipart).await?;
    let selection = OperationSelection::from_slug("convert-from-pdf", form.format()?)?;
    let files = form.into_files(selection.input_format())?;
    run(state, selection, files).await
}

/// Handler: POST /api/convert-to-pdf
///
/// Without a `format` field the source format follows the first file's extension.
pub async fn handle_convert_to_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let form = UploadForm::read(multipart).await?;
    let source = match form.format()? {
        Some(format) => format,
        None => {
            let first = form.uploads.first().ok_or(ServerError::NoInput)?;
            DocumentFormat::from_file_name(&first.name).ok_or_else(|| {
                ServerError::InvalidRequest(format!(
                    "Cannot tell the format of '{}'",
                    first.name
                ))
            })?
        }
    };
    let selection = OperationSelection::from_slug("convert-to-pdf", Some(source))?;
    let files = form.into_files(selection.input_format())?;
    run(state, selection, files).await
}

/// A file part as received, before its extension is checked
struct RawUpload {
    name: String,
    bytes: Vec<u8>,
}

/// Fields of an operation form: `file`/`files` parts and an optional `format`
struct UploadForm {
    uploads: Vec<RawUpload>,
    format: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ServerError> {
        let mut uploads = Vec::new();
        let mut format = None;

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or("").to_string();

            match field_name.as_str() {
                "file" | "files" | "files[]" => {
                    let name = field.file_name().unwrap_or("").to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was chosen
                    if name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    debug!(name = %name, bytes = bytes.len(), "Received upload");
                    uploads.push(RawUpload {
                        name,
                        bytes: bytes.to_vec(),
                    });
                }
                "format" => {
                    let text = field.text().await?;
                    if !text.trim().is_empty() {
                        format = Some(text);
                    }
                }
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(Self { uploads, format })
    }

    fn format(&self) -> Result<Option<DocumentFormat>, ServerError> {
        self.format
            .as_deref()
            .map(|name| DocumentFormat::parse(name).map_err(ServerError::from))
            .transpose()
    }

    /// Accept only files whose extension declares `format`
    fn into_files(self, format: DocumentFormat) -> Result<Vec<UploadedFile>, ServerError> {
        self.uploads
            .into_iter()
            .map(|upload| {
                if DocumentFormat::from_file_name(&upload.name) != Some(format) {
                    return Err(ServerError::InvalidRequest(format!(
                        "'{}' is not a {} file (expected {})",
                        upload.name,
                        format.label(),
                        format.extensions().join(", ")
                    )));
                }
                Ok(UploadedFile::new(upload.name, format, upload.bytes))
            })
            .collect()
    }
}

/// Dispatch on the blocking pool and deliver the result as a download
async fn run(
    state: AppState,
    selection: OperationSelection,
    files: Vec<UploadedFile>,
) -> Result<Response, ServerError> {
    info!(
        "{} request: {} file(s), {} bytes",
        selection.label(),
        files.len(),
        files.iter().map(UploadedFile::len).sum::<usize>()
    );

    let dispatcher = state.dispatcher.clone();
    let result = tokio::task::spawn_blocking(move || dispatcher.dispatch(selection, files))
        .await
        .map_err(|e| ServerError::Internal(format!("Operation task failed: {}", e)))??;

    info!(
        "{} complete: {} ({} bytes)",
        selection.label(),
        result.file_name(),
        result.len()
    );
    Ok(download(result))
}

fn download(result: ResultBuffer) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", result.file_name());
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, result.media_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        result.into_data(),
    )
        .into_response()
}
