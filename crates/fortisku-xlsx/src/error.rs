//! XLSX error types

use fortisku_zip::{ErrorKind, ZipError};
use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    /// Container error
    #[error("ZIP error: {0}")]
    Zip(#[from] ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Every listed sheet was absent or unreadable
    #[error("Workbook does not contain any worksheets")]
    NoWorksheets,

    /// Part content is not UTF-8
    #[error("Invalid UTF-8 in {part}: {source}")]
    Utf8 {
        part: String,
        #[source]
        source: std::str::Utf8Error,
    },

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failure while loading one worksheet
    #[error("sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: Box<XlsxError>,
    },

    /// A sheet's extent exceeds [`ReadOptions::max_cells`](crate::ReadOptions::max_cells)
    #[error("Sheet extent {range} spans {cells} cells, over the limit of {limit}")]
    SheetTooLarge {
        range: String,
        cells: usize,
        limit: usize,
    },

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] fortisku_core::Error),
}

impl XlsxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            XlsxError::Zip(err) => err.kind(),
            XlsxError::Sheet { source, .. } => source.kind(),
            XlsxError::SheetTooLarge { .. } => ErrorKind::Unsupported,
            _ => ErrorKind::Format,
        }
    }
}
