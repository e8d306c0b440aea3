//! # fortisku
//!
//! Read price-catalog workbooks and write bill-of-materials workbooks
//! without an external archive or compression library.
//!
//! ## Features
//!
//! - Decode `.xlsx` files into dense, typed sheets (`decode_xlsx`)
//! - Encode a single styled sheet with literal, numeric and formula cells
//!   (`encode_xlsx_sheet`)
//! - Run a decode on a worker thread (`spawn_decode`)
//! - Map catalog sheets to records by header matching ([`ingest`])
//! - Build BOM workbooks with line-total and totals formulas ([`bom`])
//!
//! ## Example
//!
//! ```rust
//! use fortisku::prelude::*;
//!
//! let rows = vec![
//!     vec![SheetCell::new("SKU", CellStyle::Header), SheetCell::new("Price", CellStyle::Header)],
//!     vec![SheetCell::new("FG-100", CellStyle::General), SheetCell::new(199.99, CellStyle::Currency)],
//! ];
//! let bytes = fortisku::encode_xlsx_sheet(&rows).unwrap();
//!
//! let workbook = fortisku::decode_xlsx(&bytes).unwrap();
//! let sheet = workbook.worksheet(0).unwrap();
//! assert_eq!(sheet.get_value("B2").unwrap(), Some(&CellValue::Number(199.99)));
//! ```

pub mod bom;
pub mod error;
pub mod ingest;
pub mod prelude;

mod worker;

pub use error::{Error, Result};
pub use worker::{spawn_decode, spawn_decode_with_options, DecodeHandle};

// Re-export core types
pub use fortisku_core::{
    col_ref, column_index_from_ref, CellAddress, CellRange, CellValue, Record, SheetFailure,
    Workbook, Worksheet, MAX_COLS, MAX_ROWS,
};

// Re-export codec types
pub use fortisku_xlsx::{
    CellStyle, ReadOptions, SheetCell, SheetErrorPolicy, WriteOptions, XlsxError, XlsxReader,
    XlsxResult, XlsxWriter, DEFAULT_MAX_CELLS,
};
pub use fortisku_zip::{ErrorKind, ZipArchive, ZipError};

use std::path::Path;

use log::debug;

/// Decode the bytes of an `.xlsx` file
pub fn decode_xlsx(bytes: &[u8]) -> XlsxResult<Workbook> {
    XlsxReader::read(bytes)
}

pub fn decode_xlsx_with_options(bytes: &[u8], options: &ReadOptions) -> XlsxResult<Workbook> {
    XlsxReader::read_with_options(bytes, options)
}

/// Encode styled rows as a single-sheet `.xlsx` file named `Sheet1`
pub fn encode_xlsx_sheet(rows: &[Vec<SheetCell>]) -> XlsxResult<Vec<u8>> {
    XlsxWriter::write_sheet(rows, &WriteOptions::default())
}

pub fn encode_xlsx_sheet_with_options(
    rows: &[Vec<SheetCell>],
    options: &WriteOptions,
) -> XlsxResult<Vec<u8>> {
    XlsxWriter::write_sheet(rows, options)
}

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt {
    /// Open a workbook from an `.xlsx`/`.xlsm` or `.csv` file
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;

    /// Save the first worksheet to an `.xlsx` or `.csv` file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();
        match extension(path).as_deref() {
            Some("xlsx") | Some("xlsm") => {
                let bytes = std::fs::read(path)?;
                debug!("read {} bytes from {}", bytes.len(), path.display());
                Ok(decode_xlsx(&bytes)?)
            }
            Some("csv") => {
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or("Sheet1");
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .from_path(path)?;

                let mut rows: Vec<Vec<CellValue>> = Vec::new();
                for record in reader.records() {
                    let record = record?;
                    rows.push(record.iter().map(CellValue::from).collect());
                }

                let mut workbook = Workbook::new();
                workbook.add_worksheet(Worksheet::from_rows(name, rows))?;
                Ok(workbook)
            }
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let sheet = self.worksheet(0).ok_or(Error::NoWorksheets)?;
        match extension(path).as_deref() {
            Some("xlsx") => {
                let bytes = XlsxWriter::write_worksheet(sheet, &WriteOptions::default())?;
                std::fs::write(path, bytes)?;
                Ok(())
            }
            Some("csv") => {
                let mut writer = csv::Writer::from_path(path)?;
                for row in sheet.rows() {
                    writer.write_record(row.iter().map(|value| value.to_string()))?;
                }
                writer.flush()?;
                Ok(())
            }
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
