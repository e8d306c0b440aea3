//! Worksheet type

use crate::cell::{col_ref, CellAddress, CellRange, CellValue};
use crate::error::{Error, Result};
use crate::record::Record;
use crate::{MAX_COLS, MAX_ROWS};

/// A single sheet: a dense, row-major matrix of [`CellValue`]s.
///
/// The matrix is kept rectangular at all times. Writing a cell past the
/// current bounds pads every row with empty strings, and touching a row
/// past the end appends all-empty rows, so a value read back at `(row, col)`
/// is always at the index it was written to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Worksheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl Worksheet {
    /// Create a new, empty worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            width: 0,
        }
    }

    /// Build a worksheet from row vectors, padding short rows
    pub fn from_rows<S: Into<String>>(name: S, rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut sheet = Self {
            name: name.into(),
            rows,
            width,
        };
        for row in &mut sheet.rows {
            row.resize_with(width, CellValue::empty);
        }
        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Set a cell value by address string (e.g. `"C7"`)
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by 0-based row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32 + 1, MAX_COLS));
        }
        self.ensure_row(row)?;
        self.ensure_width(col as usize + 1);
        self.rows[row as usize][col as usize] = value.into();
        Ok(())
    }

    /// Make sure row `row` exists, appending all-empty rows as needed
    pub fn ensure_row(&mut self, row: u32) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        let width = self.width;
        while self.rows.len() <= row as usize {
            self.rows.push(vec![CellValue::empty(); width]);
        }
        Ok(())
    }

    fn ensure_width(&mut self, width: usize) {
        if width > self.width {
            self.width = width;
            for row in &mut self.rows {
                row.resize_with(width, CellValue::empty);
            }
        }
    }

    /// Get a cell by 0-based indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.rows.get(row as usize)?.get(col as usize)
    }

    /// Get a cell by address string; `None` when outside the matrix
    pub fn get_value(&self, address: &str) -> Result<Option<&CellValue>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_at(addr.row, addr.col))
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row(&self, row: u32) -> Option<&[CellValue]> {
        self.rows.get(row as usize).map(Vec::as_slice)
    }

    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.width
    }

    /// True when the sheet has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bounding rectangle from A1 to the last observed row/column.
    ///
    /// A sheet with no rows (or no columns) reports `A1:A1`.
    pub fn dimension(&self) -> CellRange {
        let last_row = self.rows.len().saturating_sub(1) as u32;
        let last_col = self.width.saturating_sub(1) as u16;
        CellRange::from_indices(0, 0, last_row, last_col)
    }

    /// [`dimension`](Self::dimension) as an A1 string, the `!ref` equivalent
    pub fn dimension_ref(&self) -> String {
        self.dimension().to_a1_string()
    }

    /// Iterate over formula cells as `(address, formula text)`
    pub fn formula_cells(&self) -> impl Iterator<Item = (CellAddress, &str)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().filter_map(move |(c, value)| {
                value
                    .formula_text()
                    .map(|text| (CellAddress::new(r as u32, c as u16), text))
            })
        })
    }

    /// Header-keyed records: row 1 supplies the keys, every later row one record.
    ///
    /// A blank header is replaced by its column letter. Empty cells are left
    /// out of a record, and a record with no values at all is skipped.
    pub fn to_records(&self) -> Vec<Record> {
        let Some((header_row, data_rows)) = self.rows.split_first() else {
            return Vec::new();
        };
        let headers: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(c, value)| {
                if value.is_empty() {
                    col_ref(c as u32 + 1)
                } else {
                    value.to_string()
                }
            })
            .collect();

        data_rows
            .iter()
            .filter_map(|row| {
                let mut record = Record::new();
                for (header, value) in headers.iter().zip(row) {
                    if !value.is_empty() {
                        record.insert(header.clone(), value.clone());
                    }
                }
                (!record.is_empty()).then_some(record)
            })
            .collect()
    }
}
