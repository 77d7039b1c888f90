//! Document formats, uploaded inputs and result buffers

use serde::{Deserialize, Serialize};

use crate::error::ToolkitError;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const ZIP_MEDIA_TYPE: &str = "application/zip";

/// File formats the toolkit reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Word,
    Excel,
    PowerPoint,
    Image,
}

impl DocumentFormat {
    /// Formats a PDF can be converted to or from
    pub const CONVERTIBLE: [DocumentFormat; 4] = [
        DocumentFormat::Word,
        DocumentFormat::Excel,
        DocumentFormat::PowerPoint,
        DocumentFormat::Image,
    ];

    /// Human-readable name shown in the menu
    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Word => "Word",
            DocumentFormat::Excel => "Excel",
            DocumentFormat::PowerPoint => "PowerPoint",
            DocumentFormat::Image => "Image",
        }
    }

    /// Upload extensions accepted for this format
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            DocumentFormat::Pdf => &["pdf"],
            DocumentFormat::Word => &["docx"],
            DocumentFormat::Excel => &["xlsx"],
            DocumentFormat::PowerPoint => &["pptx"],
            DocumentFormat::Image => &["jpg", "jpeg", "png"],
        }
    }

    /// Extension of files this toolkit writes in this format
    pub fn output_extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Word => "docx",
            DocumentFormat::Excel => "xlsx",
            DocumentFormat::PowerPoint => "pptx",
            DocumentFormat::Image => "png",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => PDF_MEDIA_TYPE,
            DocumentFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            DocumentFormat::PowerPoint => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            DocumentFormat::Image => "image/png",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        [
            DocumentFormat::Pdf,
            DocumentFormat::Word,
            DocumentFormat::Excel,
            DocumentFormat::PowerPoint,
            DocumentFormat::Image,
        ]
        .into_iter()
        .find(|format| format.extensions().contains(&ext.as_str()))
    }

    /// Infer the format from a file name's extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Parse a format name as submitted by the menu ("word", "Excel", "powerpoint", ...)
    pub fn parse(name: &str) -> Result<Self, ToolkitError> {
        match name.trim().to_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "word" | "docx" => Ok(DocumentFormat::Word),
            "excel" | "xlsx" => Ok(DocumentFormat::Excel),
            "powerpoint" | "pptx" => Ok(DocumentFormat::PowerPoint),
            "image" | "png" | "jpg" | "jpeg" => Ok(DocumentFormat::Image),
            other => Err(ToolkitError::UnsupportedFormat(format!(
                "'{}'. Must be one of: word, excel, powerpoint, image",
                other
            ))),
        }
    }
}

/// An uploaded document, consumed once by a handler
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    format: DocumentFormat,
    bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, format: DocumentFormat, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            format,
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Fully written output of one operation, ready for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBuffer {
    data: Vec<u8>,
    media_type: String,
    file_name: String,
}

impl ResultBuffer {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }

    /// `converted_output.<ext>` buffer for a conversion result
    pub fn converted(data: Vec<u8>, format: DocumentFormat) -> Self {
        Self::new(
            data,
            format.media_type(),
            format!("converted_output.{}", format.output_extension()),
        )
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(DocumentFormat::from_file_name("a.PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_file_name("report.docx"), Some(DocumentFormat::Word));
        assert_eq!(DocumentFormat::from_file_name("photo.jpeg"), Some(DocumentFormat::Image));
        assert_eq!(DocumentFormat::from_file_name("no_extension"), None);
        assert_eq!(DocumentFormat::from_file_name("archive.tar"), None);
    }

    #[test]
    fn test_parse_accepts_menu_labels() {
        for format in DocumentFormat::CONVERTIBLE {
            assert_eq!(DocumentFormat::parse(format.label()).unwrap(), format);
        }
        assert!(DocumentFormat::parse("svg").is_err());
    }

    #[test]
    fn test_converted_buffer_names() {
        let buffer = ResultBuffer::converted(vec![1, 2, 3], DocumentFormat::Excel);
        assert_eq!(buffer.file_name(), "converted_output.xlsx");
        assert_eq!(
            buffer.media_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(buffer.len(), 3);
    }
}
