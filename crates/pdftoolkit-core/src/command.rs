use serde::{Deserialize, Serialize};

use crate::error::ToolkitError;
use crate::format::DocumentFormat;

/// One of the five menu operations, chosen per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperationSelection {
    Merge,
    Compress,
    Split,
    ConvertFromPdf { target: DocumentFormat },
    ConvertToPdf { source: DocumentFormat },
}

impl OperationSelection {
    /// Menu labels, in menu order
    pub const LABELS: [&'static str; 5] = [
        "Merge PDF",
        "Compress PDF",
        "Split PDF",
        "Convert From PDF",
        "Convert To PDF",
    ];

    pub fn convert_from_pdf(target: DocumentFormat) -> Result<Self, ToolkitError> {
        if target == DocumentFormat::Pdf {
            return Err(ToolkitError::UnsupportedFormat(
                "cannot convert PDF to PDF".into(),
            ));
        }
        Ok(OperationSelection::ConvertFromPdf { target })
    }

    pub fn convert_to_pdf(source: DocumentFormat) -> Result<Self, ToolkitError> {
        if source == DocumentFormat::Pdf {
            return Err(ToolkitError::UnsupportedFormat(
                "cannot convert PDF to PDF".into(),
            ));
        }
        Ok(OperationSelection::ConvertToPdf { source })
    }

    /// Resolve an endpoint slug such as `merge` or `convert-from-pdf`
    pub fn from_slug(slug: &str, format: Option<DocumentFormat>) -> Result<Self, ToolkitError> {
        let slug = slug.trim().trim_matches('/');
        match slug {
            "merge" => Ok(OperationSelection::Merge),
            "compress" => Ok(OperationSelection::Compress),
            "split" => Ok(OperationSelection::Split),
            "convert-from-pdf" => Self::convert_from_pdf(require_format(slug, format)?),
            "convert-to-pdf" => Self::convert_to_pdf(require_format(slug, format)?),
            other => Err(ToolkitError::InvalidInput(format!(
                "Unknown operation '{}'",
                other
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperationSelection::Merge => "Merge PDF",
            OperationSelection::Compress => "Compress PDF",
            OperationSelection::Split => "Split PDF",
            OperationSelection::ConvertFromPdf { .. } => "Convert From PDF",
            OperationSelection::ConvertToPdf { .. } => "Convert To PDF",
        }
    }

    /// URL path segment of the operation's endpoint
    pub fn slug(&self) -> &'static str {
        match self {
            OperationSelection::Merge => "merge",
            OperationSelection::Compress => "compress",
            OperationSelection::Split => "split",
            OperationSelection::ConvertFromPdf { .. } => "convert-from-pdf",
            OperationSelection::ConvertToPdf { .. } => "convert-to-pdf",
        }
    }

    /// Declared format every uploaded file must have
    pub fn input_format(&self) -> DocumentFormat {
        match self {
            OperationSelection::ConvertToPdf { source } => *source,
            _ => DocumentFormat::Pdf,
        }
    }

    /// Whether the operation takes a list of files rather than exactly one
    pub fn accepts_multiple(&self) -> bool {
        matches!(self, OperationSelection::Merge)
    }
}

fn require_format(
    operation: &str,
    format: Option<DocumentFormat>,
) -> Result<DocumentFormat, ToolkitError> {
    format.ok_or_else(|| {
        ToolkitError::InvalidInput(format!("'{}' requires a format selection", operation))
    })
}
