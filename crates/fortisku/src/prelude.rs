//! Prelude module - common imports for fortisku users
//!
//! ```rust
//! use fortisku::prelude::*;
//! ```

pub use crate::{
    // BOM export
    bom::{export_bom, BomExportOptions, BomItem},
    // Catalog ingestion
    ingest::{ingest_workbook, Catalog, CatalogRow},

    CellAddress,
    CellRange,
    // Cell types
    CellStyle,
    CellValue,

    // Error types
    Error,
    ErrorKind,
    Result,

    SheetCell,
    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,
    Worksheet,

    // I/O types
    XlsxReader,
    XlsxWriter,
};
