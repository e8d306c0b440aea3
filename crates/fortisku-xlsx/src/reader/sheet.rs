//! Worksheet part parsing

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{decode_excel_escapes, utf8};
use crate::error::{XlsxError, XlsxResult};
use fortisku_core::{column_index_from_ref, CellAddress, CellRange, CellValue, Worksheet};

/// A `<c>` element while its children are being read
#[derive(Debug, Default)]
struct PendingCell {
    row: u32,
    col: u16,
    cell_type: Option<String>,
    value: Option<String>,
    formula: Option<String>,
    inline: String,
}

/// Which text-bearing child of `<c>` the reader is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Formula,
    Inline,
}

/// Parse one worksheet part into a dense [`Worksheet`].
///
/// Rows are placed at their `r` index (or the next index when it is absent)
/// and cells at the column of their reference, so blank rows and gaps
/// survive as empty strings. The matrix never grows past `max_cells`.
pub(crate) fn read_worksheet(
    name: &str,
    xml: &[u8],
    shared_strings: &[String],
    max_cells: usize,
) -> XlsxResult<Worksheet> {
    let mut xml_reader = Reader::from_reader(xml);
    xml_reader.trim_text(false);

    let mut buf = Vec::new();
    let mut worksheet = Worksheet::new(name);

    // Index of the row being read, and the one a row without `r` gets
    let mut current_row: Option<u32> = None;
    let mut next_row: u32 = 0;
    let mut next_col: u16 = 0;

    let mut cell: Option<PendingCell> = None;
    let mut target = TextTarget::None;
    let mut in_inline = false;
    let mut in_phonetic = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => {
                    let row = row_index(&e, next_row)?;
                    check_extent(&worksheet, row, None, max_cells)?;
                    worksheet.ensure_row(row)?;
                    current_row = Some(row);
                    next_row = row + 1;
                    next_col = 0;
                }
                b"c" => {
                    cell = Some(start_cell(&e, current_row, next_row, next_col)?);
                }
                b"v" if cell.is_some() => target = TextTarget::Value,
                b"f" if cell.is_some() => target = TextTarget::Formula,
                b"is" if cell.is_some() => in_inline = true,
                b"rPh" => in_phonetic = true,
                b"t" if in_inline && !in_phonetic => target = TextTarget::Inline,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    let row = row_index(&e, next_row)?;
                    check_extent(&worksheet, row, None, max_cells)?;
                    worksheet.ensure_row(row)?;
                    next_row = row + 1;
                }
                b"c" => {
                    let pending = start_cell(&e, current_row, next_row, next_col)?;
                    next_col = pending.col.saturating_add(1);
                    check_extent(&worksheet, pending.row, Some(pending.col), max_cells)?;
                    worksheet.set_cell_value_at(pending.row, pending.col, CellValue::empty())?;
                }
                // Shared-formula followers carry only `<f t="shared" si=".."/>`
                b"f" => {
                    if let Some(pending) = cell.as_mut() {
                        pending.formula.get_or_insert_with(String::new);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"row" => current_row = None,
                b"c" => {
                    if let Some(pending) = cell.take() {
                        next_col = pending.col.saturating_add(1);
                        let (row, col) = (pending.row, pending.col);
                        check_extent(&worksheet, row, Some(col), max_cells)?;
                        let value = finish_cell(pending, shared_strings);
                        worksheet.set_cell_value_at(row, col, value)?;
                    }
                    target = TextTarget::None;
                    in_inline = false;
                }
                b"v" | b"f" => target = TextTarget::None,
                b"t" if target == TextTarget::Inline => target = TextTarget::None,
                b"is" => in_inline = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Ok(Event::Text(e)) if target != TextTarget::None => {
                let text = e.unescape()?;
                push_text(cell.as_mut(), target, &text);
            }
            Ok(Event::CData(e)) if target != TextTarget::None => {
                let text = utf8(name, &e)?;
                push_text(cell.as_mut(), target, text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "sheet '{}': {} rows x {} columns, ref {}",
        name,
        worksheet.row_count(),
        worksheet.col_count(),
        worksheet.dimension_ref()
    );
    Ok(worksheet)
}

/// Fail before the dense matrix would cover more than `max_cells` cells
fn check_extent(worksheet: &Worksheet, row: u32, col: Option<u16>, max_cells: usize) -> XlsxResult<()> {
    let last_row = (worksheet.row_count() as u32).saturating_sub(1).max(row);
    let last_col = (worksheet.col_count() as u16).saturating_sub(1);
    let last_col = col.map_or(last_col, |col| last_col.max(col));
    let extent = CellRange::from_indices(0, 0, last_row, last_col);
    let cells = (extent.row_count() as usize).saturating_mul(extent.col_count() as usize);
    if cells > max_cells {
        return Err(XlsxError::SheetTooLarge {
            range: extent.to_a1_string(),
            cells,
            limit: max_cells,
        });
    }
    Ok(())
}

/// 0-based row index from `<row r="n">`, or `fallback` without one
fn row_index(e: &BytesStart<'_>, fallback: u32) -> XlsxResult<u32> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"r" {
            let value = attr.unescape_value()?;
            return match value.trim().parse::<u32>() {
                Ok(r) if r >= 1 => Ok(r - 1),
                _ => Err(XlsxError::Parse(format!("invalid row number '{}'", value))),
            };
        }
    }
    Ok(fallback)
}

/// Open a cell at its referenced column; outside a `<row>` the reference
/// also supplies the row
fn start_cell(e: &BytesStart<'_>, row: Option<u32>, next_row: u32, next_col: u16) -> XlsxResult<PendingCell> {
    let mut pending = PendingCell {
        row: row.unwrap_or(next_row),
        col: next_col,
        ..PendingCell::default()
    };
    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"r" => {
                let reference = attr.unescape_value()?;
                let col = column_index_from_ref(&reference).map_err(|err| {
                    XlsxError::Parse(format!("cell reference '{}': {}", reference, err))
                })?;
                pending.col = (col - 1) as u16;
                if row.is_none() {
                    if let Ok(addr) = CellAddress::parse(&reference) {
                        pending.row = addr.row;
                    }
                }
            }
            b"t" => pending.cell_type = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    Ok(pending)
}

fn push_text(cell: Option<&mut PendingCell>, target: TextTarget, text: &str) {
    let Some(pending) = cell else { return };
    match target {
        TextTarget::Value => pending.value.get_or_insert_with(String::new).push_str(text),
        TextTarget::Formula => pending.formula.get_or_insert_with(String::new).push_str(text),
        TextTarget::Inline => pending.inline.push_str(text),
        TextTarget::None => {}
    }
}

/// Type the collected `<v>`/`<is>` content by the cell's `t` attribute
fn finish_cell(pending: PendingCell, shared_strings: &[String]) -> CellValue {
    let value = typed_value(&pending, shared_strings);
    match pending.formula {
        Some(text) if !text.is_empty() => CellValue::Formula {
            text,
            cached: (!value.is_empty()).then(|| Box::new(value)),
        },
        _ => value,
    }
}

fn typed_value(pending: &PendingCell, shared_strings: &[String]) -> CellValue {
    let raw = pending.value.as_deref();
    match pending.cell_type.as_deref() {
        Some("s") => {
            let index = raw.and_then(|v| v.trim().parse::<usize>().ok());
            match index.and_then(|i| shared_strings.get(i)) {
                Some(s) => CellValue::String(s.clone()),
                None => {
                    warn!(
                        "shared string index {:?} out of range ({} strings)",
                        raw,
                        shared_strings.len()
                    );
                    CellValue::empty()
                }
            }
        }
        Some("b") => match raw.map(str::trim) {
            Some(v) => CellValue::Boolean(v == "1" || v.eq_ignore_ascii_case("true")),
            None => CellValue::empty(),
        },
        Some("inlineStr") => CellValue::String(decode_excel_escapes(&pending.inline)),
        Some("str") | Some("e") | Some("d") => {
            CellValue::String(raw.map(decode_excel_escapes).unwrap_or_default())
        }
        None | Some("n") => match raw {
            None => CellValue::empty(),
            Some(v) if v.is_empty() => CellValue::empty(),
            Some(v) => match v.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => CellValue::Number(n),
                _ => CellValue::String(v.to_string()),
            },
        },
        Some(other) => {
            warn!("unknown cell type '{}', kept as text", other);
            CellValue::String(raw.unwrap_or_default().to_string())
        }
    }
}
