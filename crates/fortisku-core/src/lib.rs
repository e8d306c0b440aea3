//! # fortisku-core
//!
//! Core data structures shared by the fortisku codec crates.
//!
//! - [`CellValue`] - typed cell contents (string, number, boolean, formula)
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing, plus the
//!   base-26 column codec [`col_ref`] / [`column_index_from_ref`]
//! - [`Worksheet`] - a dense, row-major matrix of cell values
//! - [`Workbook`] - an ordered collection of named worksheets
//!
//! ## Example
//!
//! ```rust
//! use fortisku_core::{CellValue, Workbook, Worksheet};
//!
//! let mut sheet = Worksheet::new("Prices");
//! sheet.set_cell_value("A1", "SKU").unwrap();
//! sheet.set_cell_value("C2", 199.99).unwrap();
//!
//! // Row 2 was padded up to column C
//! assert_eq!(sheet.cell_at(1, 0), Some(&CellValue::empty()));
//! assert_eq!(sheet.dimension_ref(), "A1:C2");
//!
//! let mut workbook = Workbook::new();
//! workbook.add_worksheet(sheet).unwrap();
//! assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["Prices"]);
//! ```

pub mod cell;
pub mod error;
pub mod record;
pub mod workbook;
pub mod worksheet;

pub use cell::{col_ref, column_index_from_ref, CellAddress, CellRange, CellValue};
pub use error::{Error, Result};
pub use record::Record;
pub use workbook::{SheetFailure, Workbook};
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
