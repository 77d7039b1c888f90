use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("No input files provided")]
    NoInput,

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No embedded images found in PDF")]
    NoImages,

    #[error("Conversion failed: {0}")]
    ConversionError(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolkitError {
    /// Missing input is reported to the user as a warning, not a failure.
    pub fn is_warning(&self) -> bool {
        matches!(self, ToolkitError::NoInput)
    }
}
