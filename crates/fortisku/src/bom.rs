//! Bill-of-materials export.
//!
//! A BOM sheet has a fixed nine-column layout. Line totals and the totals
//! row are written as formulas over the sheet's own cells, so edits made in
//! the spreadsheet application recalculate.

use chrono::{DateTime, Utc};
use log::debug;

use fortisku_core::{col_ref, CellValue};
use fortisku_xlsx::{CellStyle, SheetCell, WriteOptions, XlsxResult, XlsxWriter};

/// Header labels, in column order `A..I`
pub const BOM_HEADERS: [&str; 9] = [
    "SKU",
    "Description #1",
    "Description #2",
    "Comments",
    "Unit Price",
    "Quantity",
    "Discount %",
    "Line Total",
    "Discounted Total",
];

/// First sheet row holding a line item
const FIRST_DATA_ROW: usize = 2;

/// One line of a BOM
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BomItem {
    pub sku: String,
    pub description: String,
    pub description2: String,
    pub comments: String,
    pub price: f64,
    pub quantity: f64,
    /// Discount in percent (`12.5` means 12.5%)
    pub discount_percent: f64,
}

impl BomItem {
    pub fn new<S: Into<String>>(sku: S, price: f64, quantity: f64) -> Self {
        Self {
            sku: sku.into(),
            price,
            quantity,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomExportOptions {
    pub sheet_name: String,
    pub include_styles: bool,
}

impl Default for BomExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: "BOM".to_string(),
            include_styles: true,
        }
    }
}

/// Lay out header, item and totals rows
pub fn bom_rows(items: &[BomItem]) -> Vec<Vec<SheetCell>> {
    let mut rows = Vec::with_capacity(items.len() + 2);

    rows.push(
        BOM_HEADERS
            .iter()
            .map(|label| SheetCell::new(*label, CellStyle::Header))
            .collect(),
    );

    for (i, item) in items.iter().enumerate() {
        let r = FIRST_DATA_ROW + i;
        rows.push(vec![
            SheetCell::new(item.sku.as_str(), CellStyle::General),
            SheetCell::new(item.description.as_str(), CellStyle::General),
            SheetCell::new(item.description2.as_str(), CellStyle::General),
            SheetCell::new(item.comments.as_str(), CellStyle::General),
            SheetCell::new(finite_or_zero(item.price), CellStyle::Currency),
            SheetCell::new(finite_or_zero(item.quantity), CellStyle::Integer),
            SheetCell::new(finite_or_zero(item.discount_percent) / 100.0, CellStyle::Percent),
            SheetCell::new(CellValue::formula(format!("E{r}*F{r}")), CellStyle::Currency),
            SheetCell::new(
                CellValue::formula(format!("E{r}*F{r}*(1-G{r})")),
                CellStyle::Currency,
            ),
        ]);
    }

    let last_data_row = FIRST_DATA_ROW + items.len() - 1;
    let sum = |column: u32| {
        let letter = col_ref(column);
        let range = if items.is_empty() {
            format!("{letter}{FIRST_DATA_ROW}")
        } else {
            format!("{letter}{FIRST_DATA_ROW}:{letter}{last_data_row}")
        };
        CellValue::formula(format!("SUM({range})"))
    };
    rows.push(vec![
        SheetCell::new("Totals", CellStyle::Header),
        SheetCell::empty(),
        SheetCell::empty(),
        SheetCell::empty(),
        SheetCell::empty(),
        SheetCell::new(sum(6), CellStyle::Integer),
        SheetCell::empty(),
        SheetCell::new(sum(8), CellStyle::Currency),
        SheetCell::new(sum(9), CellStyle::Currency),
    ]);

    rows
}

/// Encode a BOM as `.xlsx` bytes
pub fn export_bom(items: &[BomItem], options: &BomExportOptions) -> XlsxResult<Vec<u8>> {
    let rows = bom_rows(items);
    debug!("exporting BOM with {} items", items.len());
    XlsxWriter::write_sheet(
        &rows,
        &WriteOptions {
            sheet_name: options.sheet_name.clone(),
            include_styles: options.include_styles,
        },
    )
}

/// `fortisku-bom-YYYYMMDDHHMMS.xlsx`, the stamp cut to 13 digits
pub fn bom_filename(now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y%m%d%H%M%S").to_string();
    format!("fortisku-bom-{}.xlsx", &stamp[..13])
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}
