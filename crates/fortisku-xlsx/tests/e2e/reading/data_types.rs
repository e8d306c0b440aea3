//! Cell typing across shared, inline, literal, boolean, numeric and formula cells.

use crate::common::*;
use fortisku_core::CellValue;
use pretty_assertions::assert_eq;

#[test]
fn test_dataset_row_values() {
    let workbook = read_catalog();
    let data = sheet(&workbook, "DataSet");

    assert_eq!(
        data.rows()[2],
        vec![
            CellValue::from("FG-60F"),
            CellValue::from("FortiGate 60F"),
            CellValue::from("  10 x GE RJ45 "),
            CellValue::Number(1234.5),
            CellValue::from("FortiGate"),
            CellValue::Boolean(true),
        ]
    );
    assert_eq!(
        data.rows()[4],
        vec![
            CellValue::from("fc-10-0060f-950-02-12"),
            CellValue::from("FortiCare   24x7"),
            CellValue::empty(),
            CellValue::from("$1,099.00"),
            CellValue::from("Support & Services"),
            CellValue::Boolean(false),
        ]
    );
}

#[test]
fn test_headers_from_shared_strings() {
    let workbook = read_catalog();
    let data = sheet(&workbook, "DataSet");
    let headers: Vec<String> = data.rows()[1].iter().map(|v| v.to_string()).collect();
    assert_eq!(
        headers,
        vec!["SKU", "Description #1", "Description #2", "List Price", "Product Family", "In Stock"]
    );
}

#[test]
fn test_formula_keeps_text_and_cached_value() {
    let workbook = read_catalog();
    let value = cell(sheet(&workbook, "DataSet"), "D7");
    assert_eq!(value.formula_text(), Some("D3*2"));
    assert_eq!(value.effective_value(), &CellValue::Number(2469.0));
}

#[test]
fn test_non_numeric_value_falls_back_to_text() {
    let workbook = read_catalog();
    assert_eq!(cell(sheet(&workbook, "DataSet"), "E7"), CellValue::from("N/A"));
}

#[test]
fn test_escapes_errors_and_exponents() {
    let workbook = read_catalog();
    let notes = sheet(&workbook, "Notes");
    assert_eq!(
        notes.rows(),
        &[
            vec![CellValue::from("Line\nbreak"), CellValue::Number(1000.0), CellValue::empty()],
            vec![CellValue::empty(), CellValue::empty(), CellValue::from("#N/A")],
        ]
    );
}
