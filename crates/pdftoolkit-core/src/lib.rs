//! PDF toolkit operations
//!
//! Merge, compress, split and format conversion for uploaded documents,
//! built on lopdf.
//!
//! Each operation is a plain function over byte buffers:
//! - `merge_documents` / `compress_document` / `split::split_to_dir`
//! - `convert::convert_from_pdf` / `convert::convert_to_pdf`
//!
//! `Dispatcher` ties them to an `OperationSelection` and names the result.

pub mod archive;
pub mod command;
pub mod compress;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod merge;
mod page_tree;
pub mod split;

#[cfg(test)]
mod fixtures;

pub use command::OperationSelection;
pub use compress::compress_document;
pub use convert::{convert_from_pdf, convert_to_pdf};
pub use dispatch::{dispatch, Dispatcher};
pub use error::ToolkitError;
pub use format::{DocumentFormat, ResultBuffer, UploadedFile};
pub use merge::merge_documents;
pub use split::split_pages;

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, ToolkitError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| ToolkitError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}

/// Serialize a document to bytes
pub(crate) fn save_document(doc: &mut lopdf::Document) -> Result<Vec<u8>, ToolkitError> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ToolkitError::OperationError(format!("Failed to save PDF: {}", e)))?;
    Ok(buffer)
}
