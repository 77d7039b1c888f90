//! Zip packages: OOXML containers and the split-page bundle

use crate::error::ToolkitError;
use std::io::{Cursor, Read, Seek, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// In-memory zip writer
pub struct ZipPackage {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl Default for ZipPackage {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipPackage {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Add one entry; names are package-relative ("word/document.xml")
    pub fn add(&mut self, name: &str, contents: &[u8]) -> Result<(), ToolkitError> {
        self.zip
            .start_file(name, self.options)
            .map_err(|e| ToolkitError::ConversionError(format!("Failed to add {}: {}", name, e)))?;
        self.zip.write_all(contents)?;
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>, ToolkitError> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| {
                ToolkitError::ConversionError(format!("Failed to finish archive: {}", e))
            })?;
        Ok(cursor.into_inner())
    }
}

/// Open a zip-based document (docx, xlsx, pptx) for reading
pub fn open_package(bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>, ToolkitError> {
    ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ToolkitError::ConversionError(format!("Failed to open archive: {}", e)))
}

/// Read a UTF-8 part of a package, `None` if it does not exist
pub fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, ToolkitError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content).map_err(|e| {
                ToolkitError::ConversionError(format!("Failed to read {}: {}", name, e))
            })?;
            Ok(Some(content))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(ToolkitError::ConversionError(format!(
            "Failed to read {}: {}",
            name, e
        ))),
    }
}
