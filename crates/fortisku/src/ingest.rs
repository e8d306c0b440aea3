//! Catalog ingestion: map a price-list sheet to [`CatalogRow`]s by header name.
//!
//! The header row need not be the first row; it is the first row in which
//! some header maps to `sku` and another to `description`. Headers are
//! compared after lowercasing and dropping everything except `a-z`, `0-9`
//! and `#`, so `Description #1`, `description#1` and `DESCRIPTION_#1` agree.

use std::cmp::Ordering;
use std::fmt;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use fortisku_core::{CellValue, Workbook, Worksheet};

/// Sheet used when none is requested (or the requested one is absent)
pub const DEFAULT_SHEET_NAME: &str = "DataSet";

/// Names of the sheet whose `C7` carries the price-list label
const COVER_SHEET_NAMES: [&str; 3] = ["cover sheet", "cover", "coversheet"];
const COVER_ROW: u32 = 6;
const COVER_COL: u16 = 2;

static NON_KEY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9#]+").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_PRICE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.\-]+").expect("valid regex"));
static PRICE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)").expect("valid regex"));

/// A catalog column a header can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CatalogField {
    Sku,
    Description,
    Description2,
    Price,
    Category,
}

impl CatalogField {
    pub const ALL: [CatalogField; 5] = [
        CatalogField::Sku,
        CatalogField::Description,
        CatalogField::Description2,
        CatalogField::Price,
        CatalogField::Category,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CatalogField::Sku => "sku",
            CatalogField::Description => "description",
            CatalogField::Description2 => "description2",
            CatalogField::Price => "price",
            CatalogField::Category => "category",
        }
    }

    /// Normalised header spellings that name this field
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            CatalogField::Sku => &["sku", "product_sku", "part", "partnumber"],
            CatalogField::Description => &[
                "description",
                "description#1",
                "description1",
                "desc",
                "itemdescription",
                "productdescription",
            ],
            CatalogField::Description2 => &[
                "description#2",
                "description2",
                "desc2",
                "itemdescription2",
                "productdescription2",
                "secondarydescription",
            ],
            CatalogField::Price => &["price", "listprice", "unitprice", "msrp", "usdprice"],
            CatalogField::Category => &[
                "category",
                "productcategory",
                "family",
                "productfamily",
                "familyname",
                "productline",
                "bundle",
                "solution",
                "segment",
                "portfolio",
            ],
        }
    }
}

impl fmt::Display for CatalogField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One normalised catalog line
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CatalogRow {
    /// `row-N`, numbered over the non-blank data rows in sheet order
    pub id: String,
    pub sku: String,
    pub description: String,
    pub description2: String,
    pub price: Option<f64>,
    /// The price cell as shown, whitespace collapsed
    pub price_display: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IngestStats {
    /// 1-based sheet row of the detected header
    pub header_row: usize,
    /// Non-blank rows dropped for lacking a SKU or description
    pub skipped_rows: usize,
}

/// The result of ingesting one workbook
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Catalog {
    pub rows: Vec<CatalogRow>,
    pub sheet_name: String,
    pub stats: IngestStats,
    /// Trimmed `C7` of a cover sheet, when there is one
    pub cover_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("Workbook does not contain any sheets.")]
    NoSheets,

    #[error("Sheet '{0}' is empty.")]
    EmptySheet(String),

    #[error("Could not locate a header row containing SKU and Description #1 columns.")]
    HeaderNotFound,

    #[error("No data rows contained valid SKU and Description #1 values.")]
    NoDataRows,
}

/// Decode an `.xlsx` catalog and ingest it
pub fn ingest_xlsx(bytes: &[u8], requested_sheet: Option<&str>) -> crate::Result<Catalog> {
    let workbook = crate::decode_xlsx(bytes)?;
    Ok(ingest_workbook(&workbook, requested_sheet)?)
}

pub fn ingest_workbook(
    workbook: &Workbook,
    requested_sheet: Option<&str>,
) -> Result<Catalog, IngestError> {
    let sheet = resolve_sheet(workbook, requested_sheet).ok_or(IngestError::NoSheets)?;
    if sheet.is_empty() {
        return Err(IngestError::EmptySheet(sheet.name().to_string()));
    }

    let (header_index, header_map) =
        find_header_row(sheet.rows()).ok_or(IngestError::HeaderNotFound)?;
    let (rows, skipped_rows) = normalize_rows(&sheet.rows()[header_index + 1..], &header_map);
    if rows.is_empty() {
        return Err(IngestError::NoDataRows);
    }

    debug!(
        "ingested {} rows from '{}' (header at row {}, {} skipped)",
        rows.len(),
        sheet.name(),
        header_index + 1,
        skipped_rows
    );
    Ok(Catalog {
        rows,
        sheet_name: sheet.name().to_string(),
        stats: IngestStats {
            header_row: header_index + 1,
            skipped_rows,
        },
        cover_info: cover_info(workbook),
    })
}

/// The requested sheet (case-insensitive), else `DataSet`, else the first
pub fn resolve_sheet<'a>(workbook: &'a Workbook, requested: Option<&str>) -> Option<&'a Worksheet> {
    if let Some(name) = requested.filter(|n| !n.is_empty()) {
        if let Some(sheet) = workbook.worksheet_by_name_ignore_case(name) {
            return Some(sheet);
        }
        warn!(
            "sheet '{}' not found (available: {}); falling back",
            name,
            workbook.sheet_names().collect::<Vec<_>>().join(", ")
        );
    }
    workbook
        .worksheet_by_name_ignore_case(DEFAULT_SHEET_NAME)
        .or_else(|| workbook.worksheet(0))
}

/// Lowercase and keep only `a-z`, `0-9` and `#`
pub fn normalize_key(value: &str) -> String {
    NON_KEY_CHARS
        .replace_all(&value.trim().to_lowercase(), "")
        .into_owned()
}

/// Field for one header: exact field name, then exact synonym, then substring
pub fn map_header(header: &str) -> Option<CatalogField> {
    let normalized = normalize_key(header);
    if normalized.is_empty() {
        return None;
    }

    CatalogField::ALL
        .into_iter()
        .find(|field| normalized == field.key())
        .or_else(|| {
            CatalogField::ALL
                .into_iter()
                .find(|field| field.synonyms().contains(&normalized.as_str()))
        })
        .or_else(|| {
            CatalogField::ALL.into_iter().find(|field| {
                normalized.contains(field.key())
                    || field.synonyms().iter().any(|alias| normalized.contains(*alias))
            })
        })
}

pub fn map_headers(row: &[CellValue]) -> Vec<Option<CatalogField>> {
    row.iter().map(|cell| map_header(&cell.to_string())).collect()
}

fn find_header_row(rows: &[Vec<CellValue>]) -> Option<(usize, Vec<Option<CatalogField>>)> {
    rows.iter().enumerate().find_map(|(index, row)| {
        if is_blank(row) {
            return None;
        }
        let header_map = map_headers(row);
        let has = |field| header_map.contains(&Some(field));
        (has(CatalogField::Sku) && has(CatalogField::Description)).then_some((index, header_map))
    })
}

fn normalize_rows(rows: &[Vec<CellValue>], header_map: &[Option<CatalogField>]) -> (Vec<CatalogRow>, usize) {
    let mut normalized = Vec::new();
    let mut next_id = 1;
    let mut skipped_rows = 0;

    for row in rows {
        if is_blank(row) {
            continue;
        }

        let mut record = CatalogRow {
            id: format!("row-{}", next_id),
            ..CatalogRow::default()
        };
        next_id += 1;

        for (field, value) in header_map.iter().zip(row) {
            let Some(field) = field else { continue };
            let value = value.effective_value();
            if value.is_empty() {
                continue;
            }

            let text = sanitize(&value.to_string());
            match field {
                CatalogField::Price => {
                    if let Some(price) = coerce_price(value) {
                        record.price = Some(price);
                    }
                    record.price_display = text;
                }
                CatalogField::Sku => record.sku = text,
                CatalogField::Description => record.description = text,
                CatalogField::Description2 => record.description2 = text,
                CatalogField::Category => record.category = text,
            }
        }

        if record.sku.is_empty() || record.description.is_empty() {
            skipped_rows += 1;
            continue;
        }
        normalized.push(record);
    }

    normalized.sort_by(|a, b| compare_sku(&a.sku, &b.sku));
    (normalized, skipped_rows)
}

fn compare_sku(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn is_blank(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_empty)
}

/// Collapse whitespace runs to one space and trim
pub fn sanitize(value: &str) -> String {
    WHITESPACE.replace_all(value, " ").trim().to_string()
}

/// A number as-is; text with everything but digits, `.` and `-` removed,
/// read up to the first character that does not continue a number
pub fn coerce_price(value: &CellValue) -> Option<f64> {
    if let CellValue::Number(n) = value {
        return n.is_finite().then_some(*n);
    }
    let cleaned = NON_PRICE_CHARS.replace_all(&value.to_string(), "").into_owned();
    let prefix = PRICE_PREFIX.find(&cleaned)?;
    prefix.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn cover_info(workbook: &Workbook) -> Option<String> {
    let sheet = workbook.worksheets().iter().find(|sheet| {
        let name = sheet.name().trim().to_lowercase();
        COVER_SHEET_NAMES.contains(&name.as_str())
    })?;
    let value = sheet.cell_at(COVER_ROW, COVER_COL)?.to_string();
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
