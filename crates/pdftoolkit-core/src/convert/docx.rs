//! Word (.docx) conversions
//!
//! DOCX files are ZIP archives; the body text lives in `word/document.xml`.

use super::extract::page_texts;
use super::layout::TextLayout;
use super::ooxml::{
    collect_paragraphs, content_types, escape_text, relationships, OFFICE_DOCUMENT_REL, XML_HEADER,
};
use crate::archive::{open_package, read_part, ZipPackage};
use crate::error::ToolkitError;

const DOCUMENT_PART: &str = "word/document.xml";
const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Letter page with 1 inch margins, in twentieths of a point
const SECTION_PROPERTIES: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#;

const PAGE_BREAK: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

/// Paragraph text of a Word document, in document order
pub fn read_paragraphs(bytes: &[u8]) -> Result<Vec<String>, ToolkitError> {
    let mut archive = open_package(bytes)?;
    let xml = read_part(&mut archive, DOCUMENT_PART)?.ok_or_else(|| {
        ToolkitError::ConversionError(format!("{} missing: not a Word document", DOCUMENT_PART))
    })?;
    collect_paragraphs(&xml)
}

/// Lay out a Word document's paragraphs as a text PDF
pub fn docx_to_pdf(bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    let paragraphs = read_paragraphs(bytes)?;
    TextLayout::letter().render(&[paragraphs])
}

/// Write each PDF page's text as paragraphs, with a page break between pages
pub fn pdf_to_docx(bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    let pages = page_texts(bytes)?;
    write_docx(&pages)
}

/// Build a Word document; each entry is one page, each line one paragraph
pub fn write_docx(pages: &[String]) -> Result<Vec<u8>, ToolkitError> {
    let mut body = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            body.push_str(PAGE_BREAK);
        }
        if page.is_empty() {
            body.push_str("<w:p/>");
        }
        for line in page.lines() {
            body.push_str(&format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                escape_text(line)
            ));
        }
    }

    let document = format!(
        r#"{}<w:document xmlns:w="{}"><w:body>{}{}</w:body></w:document>"#,
        XML_HEADER, WORDML_NS, body, SECTION_PROPERTIES
    );

    let mut package = ZipPackage::new();
    package.add(
        "[Content_Types].xml",
        content_types(&[(format!("/{}", DOCUMENT_PART), DOCUMENT_CONTENT_TYPE)]).as_bytes(),
    )?;
    package.add(
        "_rels/.rels",
        relationships(&[(
            "rId1".to_string(),
            OFFICE_DOCUMENT_REL,
            DOCUMENT_PART.to_string(),
        )])
        .as_bytes(),
    )?;
    package.add(DOCUMENT_PART, document.as_bytes())?;
    package.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::layout::render_text_pdf;
    use crate::fixtures::page_count;
    use lopdf::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_written_docx_reads_back() {
        let docx = write_docx(&["One\nTwo <&>".to_string(), "Three".to_string()]).unwrap();
        let paragraphs = read_paragraphs(&docx).unwrap();

        // The page break is an empty paragraph
        assert_eq!(paragraphs, vec!["One", "Two <&>", "", "Three"]);
    }

    #[test]
    fn test_docx_to_pdf_contains_text() {
        let docx = write_docx(&["Quarterly report".to_string()]).unwrap();
        let pdf = docx_to_pdf(&docx).unwrap();

        assert_eq!(page_count(&pdf), 1);
        let doc = Document::load_mem(&pdf).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        assert!(String::from_utf8_lossy(&content).contains("(Quarterly report)"));
    }

    #[test]
    fn test_pdf_to_docx_keeps_page_text() {
        let pdf = render_text_pdf(&["Page one text", "Page two text"]).unwrap();
        let docx = pdf_to_docx(&pdf).unwrap();

        let paragraphs = read_paragraphs(&docx).unwrap();
        assert!(paragraphs.iter().any(|p| p.contains("Page one text")));
        assert!(paragraphs.iter().any(|p| p.contains("Page two text")));
    }

    #[test]
    fn test_docx_to_pdf_rejects_other_archives() {
        let mut package = ZipPackage::new();
        package.add("hello.txt", b"hi").unwrap();
        let zip = package.finish().unwrap();

        assert!(matches!(
            docx_to_pdf(&zip),
            Err(ToolkitError::ConversionError(_))
        ));
    }
}
