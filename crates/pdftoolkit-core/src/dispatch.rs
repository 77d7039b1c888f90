//! Route a selected operation to its handler
//!
//! The dispatcher validates the uploaded files against the selection and
//! returns the handler's output as a named, typed result buffer.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::archive::ZipPackage;
use crate::command::OperationSelection;
use crate::compress::compress_document;
use crate::convert::{convert_from_pdf, convert_to_pdf};
use crate::error::ToolkitError;
use crate::format::{DocumentFormat, ResultBuffer, UploadedFile, PDF_MEDIA_TYPE, ZIP_MEDIA_TYPE};
use crate::merge::merge_documents;
use crate::split::split_to_dir;

pub const MERGED_FILE_NAME: &str = "merged_output.pdf";
pub const COMPRESSED_FILE_NAME: &str = "compressed_output.pdf";
pub const SPLIT_ARCHIVE_NAME: &str = "split_output.zip";

/// Runs operations; split output is staged under `work_dir`
#[derive(Debug, Clone)]
pub struct Dispatcher {
    work_dir: PathBuf,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl Dispatcher {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Run `selection` over `files` and return the downloadable result
    pub fn dispatch(
        &self,
        selection: OperationSelection,
        files: Vec<UploadedFile>,
    ) -> Result<ResultBuffer, ToolkitError> {
        debug!(
            operation = selection.slug(),
            files = files.len(),
            bytes = files.iter().map(UploadedFile::len).sum::<usize>(),
            "Dispatching operation"
        );

        let expected = selection.input_format();
        if let Some(file) = files.iter().find(|f| f.format() != expected) {
            return Err(ToolkitError::UnsupportedFormat(format!(
                "'{}' is not a {} file",
                file.name(),
                expected.label()
            )));
        }

        let result = match selection {
            OperationSelection::Merge => {
                let documents = files.into_iter().map(UploadedFile::into_bytes).collect();
                ResultBuffer::new(
                    merge_documents(documents)?,
                    PDF_MEDIA_TYPE,
                    MERGED_FILE_NAME,
                )
            }
            OperationSelection::Compress => {
                let file = single(files)?;
                ResultBuffer::new(
                    compress_document(file.bytes())?,
                    PDF_MEDIA_TYPE,
                    COMPRESSED_FILE_NAME,
                )
            }
            OperationSelection::Split => {
                let file = single(files)?;
                ResultBuffer::new(self.split(file.bytes())?, ZIP_MEDIA_TYPE, SPLIT_ARCHIVE_NAME)
            }
            OperationSelection::ConvertFromPdf { target } => {
                let file = single(files)?;
                ResultBuffer::converted(convert_from_pdf(target, file.bytes())?, target)
            }
            OperationSelection::ConvertToPdf { source } => {
                let file = single(files)?;
                ResultBuffer::converted(convert_to_pdf(source, file.bytes())?, DocumentFormat::Pdf)
            }
        };

        debug!(
            operation = selection.slug(),
            file_name = result.file_name(),
            bytes = result.len(),
            "Operation complete"
        );
        Ok(result)
    }

    /// Write the pages into a private directory, then bundle them in page order
    fn split(&self, bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
        let staging = tempfile::Builder::new()
            .prefix("split-")
            .tempdir_in(&self.work_dir)?;

        let paths = split_to_dir(bytes, staging.path())?;
        debug!(dir = %staging.path().display(), pages = paths.len(), "Split pages written");

        let mut package = ZipPackage::new();
        for path in &paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| ToolkitError::OperationError("Split page has no file name".into()))?;
            package.add(&name, &fs::read(path)?)?;
        }
        package.finish()
    }
}

/// Run one operation with a dispatcher staging under the system temp dir
pub fn dispatch(
    selection: OperationSelection,
    files: Vec<UploadedFile>,
) -> Result<ResultBuffer, ToolkitError> {
    Dispatcher::default().dispatch(selection, files)
}

fn single(files: Vec<UploadedFile>) -> Result<UploadedFile, ToolkitError> {
    let count = files.len();
    let mut files = files.into_iter();
    match (files.next(), count) {
        (None, _) => Err(ToolkitError::NoInput),
        (Some(file), 1) => Ok(file),
        (Some(_), n) => Err(ToolkitError::InvalidInput(format!(
            "Expected exactly one file, got {}",
            n
        ))),
    }
}
