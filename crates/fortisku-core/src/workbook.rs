//! Workbook type

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;

/// A sheet that could not be loaded, kept when decoding isolates failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetFailure {
    /// Sheet name as listed in the workbook part
    pub name: String,
    /// Rendered error message
    pub message: String,
}

/// An ordered collection of named worksheets.
///
/// Sheet order is the order sheets were added, which for a decoded file is
/// the document order of the workbook part.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    failed_sheets: Vec<SheetFailure>,
}

impl Workbook {
    /// Create a workbook with no sheets
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.worksheets.iter().map(Worksheet::name)
    }

    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Exact-name lookup
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Case-insensitive lookup
    pub fn worksheet_by_name_ignore_case(&self, name: &str) -> Option<&Worksheet> {
        let wanted = name.to_lowercase();
        self.worksheets
            .iter()
            .find(|ws| ws.name().to_lowercase() == wanted)
    }

    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    /// Append a worksheet, returning its index
    pub fn add_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        self.validate_sheet_name(worksheet.name())?;
        self.worksheets.push(worksheet);
        Ok(self.worksheets.len() - 1)
    }

    /// Append an empty worksheet with the given name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_worksheet(Worksheet::new(name))
    }

    /// Record a sheet that was listed but could not be loaded
    pub fn record_failure<N: Into<String>, M: Into<String>>(&mut self, name: N, message: M) {
        self.failed_sheets.push(SheetFailure {
            name: name.into(),
            message: message.into(),
        });
    }

    /// Sheets skipped during a decode that isolates per-sheet failures
    pub fn failed_sheets(&self) -> &[SheetFailure] {
        &self.failed_sheets
    }

    // Only blank and exact duplicate names are rejected.
    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if self.worksheets.iter().any(|ws| ws.name() == name) {
            return Err(Error::DuplicateSheetName(name.into()));
        }
        Ok(())
    }
}
