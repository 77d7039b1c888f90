//! PDF content-stream compression
//!
//! Flate-encodes every page's unfiltered content streams, page by page, then
//! lets lopdf compress whatever other streams remain unfiltered.

use crate::error::ToolkitError;
use crate::save_document;
use flate2::{write::ZlibEncoder, Compression};
use lopdf::{Document, Object, Stream};
use std::io::Write;

/// Compress the content streams of every page, keeping page order and count
pub fn compress_document(bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    let mut doc = Document::load_mem(bytes).map_err(|e| ToolkitError::ParseError(e.to_string()))?;

    let pages = doc.get_pages();
    for page_id in pages.into_values() {
        for content_id in doc.get_page_contents(page_id) {
            if let Ok(Object::Stream(stream)) = doc.get_object_mut(content_id) {
                compress_stream(stream)?;
            }
        }
    }

    doc.prune_objects();
    doc.compress();

    save_document(&mut doc)
}

/// Flate-encode a stream in place. Already-filtered streams are left alone.
///
/// Returns whether the stream was rewritten.
pub fn compress_stream(stream: &mut Stream) -> Result<bool, ToolkitError> {
    if stream.dict.has(b"Filter") || stream.content.is_empty() {
        return Ok(false);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&stream.content)?;
    let compressed = encoder.finish()?;

    if compressed.len() >= stream.content.len() {
        return Ok(false);
    }

    stream.dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    stream.set_content(compressed);
    Ok(true)
}
