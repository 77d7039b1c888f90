//! Per-page text extraction

use crate::error::ToolkitError;
use lopdf::Document;

/// Text of every page, in page order. Trailing whitespace on each line and
/// trailing blank lines are dropped.
pub fn page_texts(bytes: &[u8]) -> Result<Vec<String>, ToolkitError> {
    let doc = Document::load_mem(bytes).map_err(|e| ToolkitError::ParseError(e.to_string()))?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();

    page_numbers
        .into_iter()
        .map(|page| {
            doc.extract_text(&[page])
                .map(|text| normalize(&text))
                .map_err(|e| {
                    ToolkitError::ConversionError(format!(
                        "Failed to extract text from page {}: {}",
                        page, e
                    ))
                })
        })
        .collect()
}

fn normalize(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}
