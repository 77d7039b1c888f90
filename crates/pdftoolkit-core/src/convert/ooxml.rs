//! Shared Office Open XML helpers: text collection and escaping

use crate::error::ToolkitError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub(crate) const XML_HEADER: &str =
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) const CONTENT_TYPES_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";
pub(crate) const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// `[Content_Types].xml` with the rels/xml defaults plus the given overrides
pub(crate) fn content_types(overrides: &[(String, &str)]) -> String {
    let mut xml = format!(
        r#"{}<Types xmlns="{}"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
        XML_HEADER, CONTENT_TYPES_NS
    );
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            part, content_type
        ));
    }
    xml.push_str("</Types>");
    xml
}

/// A relationships part; each entry is (id, type, target)
pub(crate) fn relationships(entries: &[(String, &str, String)]) -> String {
    let mut xml = format!(r#"{}<Relationships xmlns="{}">"#, XML_HEADER, RELATIONSHIPS_NS);
    for (id, rel_type, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Collect the text of every `p` paragraph, reading `t` runs.
///
/// Works for both WordprocessingML (`w:p`/`w:t`) and DrawingML (`a:p`/`a:t`).
/// Tabs inside runs and line breaks are kept as `\t` and `\n`.
pub(crate) fn collect_paragraphs(xml: &str) -> Result<Vec<String>, ToolkitError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"r" => in_run = true,
                b"t" => in_text = in_paragraph,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_paragraph && !is_page_break(&e) => current.push('\n'),
                b"p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(text)) if in_text => {
                let text = text.unescape().map_err(|e| {
                    ToolkitError::ConversionError(format!("Malformed XML text: {}", e))
                })?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => in_run = false,
                b"p" => {
                    in_paragraph = false;
                    paragraphs.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ToolkitError::ConversionError(format!(
                    "Malformed XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

/// `<w:br w:type="page"/>` separates pages, not lines
fn is_page_break(element: &BytesStart<'_>) -> bool {
    element.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"type" && attr.value.as_ref() == b"page"
    })
}

/// Escape text for element content, dropping characters XML 1.0 forbids
pub(crate) fn escape_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
        .filter(|&c| c != '\u{FFFE}' && c != '\u{FFFF}')
        .collect();
    quick_xml::escape::escape(cleaned.as_str()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_word_paragraphs() {
        let xml = r#"<w:document xmlns:w="urn:w"><w:body>
            <w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
                <w:r><w:t>Hello </w:t></w:r><w:r><w:tab/><w:t>world</w:t></w:r></w:p>
            <w:p/>
            <w:p><w:r><w:t>A &amp; B</w:t><w:br/><w:t>next</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let paragraphs = collect_paragraphs(xml).unwrap();

        assert_eq!(paragraphs, vec!["Hello \tworld", "", "A & B\nnext"]);
    }

    #[test]
    fn test_collect_drawing_paragraphs() {
        let xml = r#"<p:sld xmlns:p="urn:p" xmlns:a="urn:a"><p:txBody>
            <a:p><a:r><a:t>Title</a:t></a:r></a:p>
            <a:p><a:r><a:t>Line one</a:t></a:r><a:br/><a:r><a:t>Line two</a:t></a:r></a:p>
        </p:txBody></p:sld>"#;

        let paragraphs = collect_paragraphs(xml).unwrap();

        assert_eq!(paragraphs, vec!["Title", "Line one\nLine two"]);
    }

    #[test]
    fn test_collect_rejects_malformed_xml() {
        assert!(collect_paragraphs("<w:p><w:t>unclosed</w:p>").is_err());
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & \"c\"\u{0}"), "a &lt; b &amp; &quot;c&quot;");
    }
}
