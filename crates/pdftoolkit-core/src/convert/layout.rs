//! Plain-text PDF writer
//!
//! Lays out lines of text in Helvetica on fixed-size pages. Used by every
//! "to PDF" conversion except images.

use crate::error::ToolkitError;
use crate::save_document;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Page geometry and type settings, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub leading: f32,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self::letter()
    }
}

impl TextLayout {
    /// US Letter portrait, 1 inch margins
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin: 72.0,
            font_size: 11.0,
            leading: 14.0,
        }
    }

    /// Letter landscape with larger type, for slides
    pub fn landscape() -> Self {
        Self {
            width: 792.0,
            height: 612.0,
            margin: 54.0,
            font_size: 14.0,
            leading: 18.0,
        }
    }

    /// Characters per line, using Helvetica's average glyph width
    fn chars_per_line(&self) -> usize {
        let usable = self.width - 2.0 * self.margin;
        ((usable / (self.font_size * 0.5)) as usize).max(1)
    }

    fn lines_per_page(&self) -> usize {
        let usable = self.height - 2.0 * self.margin;
        ((usable / self.leading) as usize).max(1)
    }

    /// Word-wrap a paragraph into lines that fit the page width
    pub fn wrap(&self, paragraph: &str) -> Vec<String> {
        let max = self.chars_per_line();
        let mut lines = Vec::new();

        for raw_line in paragraph.replace('\t', "    ").lines() {
            let mut line = String::new();
            let mut line_len = 0;

            for word in raw_line.split_whitespace() {
                let mut word: Vec<char> = word.chars().collect();

                // Hard-break words longer than a full line
                while word.len() > max {
                    if line_len > 0 {
                        lines.push(std::mem::take(&mut line));
                        line_len = 0;
                    }
                    let rest = word.split_off(max);
                    lines.push(word.into_iter().collect());
                    word = rest;
                }

                let needed = if line_len == 0 { word.len() } else { word.len() + 1 };
                if line_len + needed > max {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.extend(word.iter());
                line_len += word.len();
            }

            lines.push(line);
        }

        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    /// Render sections of paragraphs. Each section starts on a new page and
    /// overflows onto as many pages as it needs.
    pub fn render(&self, sections: &[Vec<String>]) -> Result<Vec<u8>, ToolkitError> {
        let mut pages: Vec<Vec<String>> = Vec::new();

        for section in sections {
            let lines: Vec<String> = section.iter().flat_map(|p| self.wrap(p)).collect();
            if lines.is_empty() {
                pages.push(Vec::new());
                continue;
            }
            for chunk in lines.chunks(self.lines_per_page()) {
                pages.push(chunk.to_vec());
            }
        }

        // A PDF needs at least one page
        if pages.is_empty() {
            pages.push(Vec::new());
        }

        self.build(&pages)
    }

    fn build(&self, pages: &[Vec<String>]) -> Result<Vec<u8>, ToolkitError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));
        let resources_id = doc.add_object(Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "F1",
                Object::Reference(font_id),
            )])),
        )]));

        let mut page_ids: Vec<ObjectId> = Vec::with_capacity(pages.len());
        for lines in pages {
            let content = self.page_content(lines);
            let encoded = content
                .encode()
                .map_err(|e| {
                    ToolkitError::OperationError(format!("Failed to encode page: {}", e))
                })?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(self.width),
                        Object::Real(self.height),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
                ("Resources", Object::Reference(resources_id)),
            ]);
            page_ids.push(doc.add_object(page));
        }

        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(page_ids.len() as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        doc.compress();
        save_document(&mut doc)
    }

    /// One text object per line so extractors see line breaks
    fn page_content(&self, lines: &[String]) -> Content {
        let mut operations = Vec::with_capacity(lines.len() * 5);
        let top = self.height - self.margin - self.font_size;

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let y = top - i as f32 * self.leading;
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Real(self.font_size)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![Object::Real(self.margin), Object::Real(y)],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        Content { operations }
    }
}

/// Render one page of text per entry, using the default layout
pub fn render_text_pdf(pages: &[&str]) -> Result<Vec<u8>, ToolkitError> {
    let sections: Vec<Vec<String>> = pages.iter().map(|p| vec![p.to_string()]).collect();
    TextLayout::letter().render(&sections)
}

/// Map text onto the Latin-1 subset of WinAnsiEncoding; anything else becomes '?'
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
            _ => b'?',
        })
        .collect()
}
