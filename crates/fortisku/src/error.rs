//! Error types for the fortisku facade

use thiserror::Error;

use crate::ingest::IngestError;

/// Result type for fortisku operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Xlsx(#[from] fortisku_xlsx::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Core(#[from] fortisku_core::Error),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("No worksheets to save")]
    NoWorksheets,

    /// The decode thread ended without reporting a result
    #[error("decode worker terminated without a result")]
    WorkerLost,
}
