//! Reader and writer options

/// Default cap on the cells of one decoded sheet (rows x columns of its extent)
pub const DEFAULT_MAX_CELLS: usize = 1 << 22;

/// What to do when one worksheet fails to inflate or parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SheetErrorPolicy {
    /// Fail the whole decode
    #[default]
    Abort,
    /// Leave the sheet out and record it in [`Workbook::failed_sheets`](fortisku_core::Workbook::failed_sheets)
    Skip,
}

/// Options for [`XlsxReader`](crate::XlsxReader)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Check each part against its stored CRC-32
    pub verify_crc: bool,
    pub sheet_errors: SheetErrorPolicy,
    /// Largest sheet extent, in cells, the dense matrix may grow to
    pub max_cells: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            verify_crc: true,
            sheet_errors: SheetErrorPolicy::Abort,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl ReadOptions {
    pub(crate) fn zip_options(&self) -> fortisku_zip::ReadOptions {
        fortisku_zip::ReadOptions {
            verify_crc: self.verify_crc,
        }
    }
}

/// Options for [`XlsxWriter`](crate::XlsxWriter)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Name of the single sheet
    pub sheet_name: String,
    /// Emit `xl/styles.xml` so cell style indices resolve
    pub include_styles: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            include_styles: true,
        }
    }
}
