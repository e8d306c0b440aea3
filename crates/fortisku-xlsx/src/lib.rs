//! # fortisku-xlsx
//!
//! XLSX (Office Open XML) reader and writer for fortisku.
//!
//! The reader maps `xl/workbook.xml`, its relationships, the shared-string
//! table and each worksheet part onto a [`fortisku_core::Workbook`] of dense
//! sheets. The writer emits a single-sheet, store-only package with inline
//! strings, numbers and formulas, plus an optional fixed style sheet.

pub mod error;
pub mod options;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use options::{ReadOptions, SheetErrorPolicy, WriteOptions, DEFAULT_MAX_CELLS};
pub use reader::XlsxReader;
pub use styles::CellStyle;
pub use writer::{SheetCell, XlsxWriter};
