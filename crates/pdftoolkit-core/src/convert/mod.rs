//! Format conversions to and from PDF
//!
//! Office formats go through plain text: PDF pages are extracted with lopdf
//! and written as paragraphs, rows or slides; Office text is laid out on new
//! PDF pages. Images are embedded or pulled out without rasterizing.

pub mod docx;
pub mod extract;
pub mod image;
pub mod layout;
pub(crate) mod ooxml;
pub mod pptx;
pub mod xlsx;

use crate::error::ToolkitError;
use crate::format::DocumentFormat;

/// Convert a document of the given format into a PDF
pub fn convert_to_pdf(source: DocumentFormat, bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    match source {
        DocumentFormat::Word => docx::docx_to_pdf(bytes),
        DocumentFormat::Excel => xlsx::xlsx_to_pdf(bytes),
        DocumentFormat::PowerPoint => pptx::pptx_to_pdf(bytes),
        DocumentFormat::Image => image::image_to_pdf(bytes),
        DocumentFormat::Pdf => Err(ToolkitError::UnsupportedFormat(
            "Input is already a PDF".into(),
        )),
    }
}

/// Convert a PDF into the given format
pub fn convert_from_pdf(target: DocumentFormat, bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    match target {
        DocumentFormat::Word => docx::pdf_to_docx(bytes),
        DocumentFormat::Excel => xlsx::pdf_to_xlsx(bytes),
        DocumentFormat::PowerPoint => pptx::pdf_to_pptx(bytes),
        DocumentFormat::Image => image::pdf_to_png(bytes),
        DocumentFormat::Pdf => Err(ToolkitError::UnsupportedFormat(
            "Cannot convert a PDF to PDF".into(),
        )),
    }
}
