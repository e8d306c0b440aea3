//! Encoded sheets read back with the same shape and cell types.

use crate::common::*;
use fortisku_core::{CellValue, Worksheet};
use fortisku_xlsx::{CellStyle, SheetCell, WriteOptions, XlsxReader, XlsxWriter};
use fortisku_zip::{CompressionMethod, ZipArchive};
use pretty_assertions::assert_eq;

fn price_rows() -> Vec<Vec<SheetCell>> {
    vec![
        vec![
            SheetCell::new("SKU", CellStyle::Header),
            SheetCell::new("Unit Price", CellStyle::Header),
            SheetCell::new("Quantity", CellStyle::Header),
            SheetCell::new("Line Total", CellStyle::Header),
        ],
        vec![
            SheetCell::new("FG-100", CellStyle::General),
            SheetCell::new(199.99, CellStyle::Currency),
            SheetCell::new(2.0, CellStyle::Integer),
            SheetCell::new(CellValue::formula("B2*C2"), CellStyle::Currency),
        ],
        vec![
            SheetCell::new("FG-200 <HA> & \"pair\"", CellStyle::General),
            SheetCell::new(299.5, CellStyle::Currency),
            SheetCell::new(1.0, CellStyle::Integer),
            SheetCell::new(CellValue::formula("B3*C3"), CellStyle::Currency),
        ],
        vec![
            SheetCell::new("Totals", CellStyle::Header),
            SheetCell::empty(),
            SheetCell::empty(),
            SheetCell::new(CellValue::formula("SUM(D2:D3)"), CellStyle::Currency),
        ],
    ]
}

#[test]
fn test_styled_sheet_roundtrip() {
    let bytes = XlsxWriter::write_sheet(&price_rows(), &WriteOptions::default()).unwrap();
    let workbook = XlsxReader::read(&bytes).unwrap();

    assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["Sheet1"]);
    let ws = sheet(&workbook, "Sheet1");
    assert_eq!(ws.dimension_ref(), "A1:D4");
    assert_eq!(cell(ws, "A1"), CellValue::from("SKU"));
    assert_eq!(cell(ws, "B2"), CellValue::Number(199.99));
    assert_eq!(cell(ws, "A3"), CellValue::from("FG-200 <HA> & \"pair\""));
    assert_eq!(cell(ws, "B3"), CellValue::Number(299.5));
    assert_eq!(cell(ws, "D2"), CellValue::formula("B2*C2"));
    assert_eq!(cell(ws, "D4").formula_text(), Some("SUM(D2:D3)"));
    assert_eq!(cell(ws, "B4"), CellValue::empty());
}

#[test]
fn test_package_layout() {
    let bytes = XlsxWriter::write_sheet(&price_rows(), &WriteOptions::default()).unwrap();
    let archive = ZipArchive::new(&bytes).unwrap();

    let names: Vec<&str> = archive.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/worksheets/sheet1.xml",
        ]
    );
    assert!(archive
        .entries()
        .iter()
        .all(|e| e.method == CompressionMethod::Stored));

    let styles = String::from_utf8(archive.read_by_name("xl/styles.xml").unwrap()).unwrap();
    assert!(styles.contains(r#"<numFmt numFmtId="164" formatCode="$#,##0.00"/>"#));
    assert!(styles.contains(r#"<cellXfs count="5">"#));
}

#[test]
fn test_without_styles() {
    let options = WriteOptions {
        sheet_name: "Plain".into(),
        include_styles: false,
    };
    let bytes = XlsxWriter::write_sheet(&price_rows(), &options).unwrap();
    let archive = ZipArchive::new(&bytes).unwrap();
    assert!(!archive.contains("xl/styles.xml"));

    let sheet_xml = String::from_utf8(archive.read_by_name("xl/worksheets/sheet1.xml").unwrap()).unwrap();
    assert!(!sheet_xml.contains(" s=\""));

    let workbook = XlsxReader::read(&bytes).unwrap();
    assert_eq!(cell(sheet(&workbook, "Plain"), "C2"), CellValue::Number(2.0));
}

#[test]
fn test_decoded_catalog_reencodes() {
    let catalog = read_catalog();
    let original = sheet(&catalog, "DataSet");

    let bytes = XlsxWriter::write_worksheet(original, &WriteOptions::default()).unwrap();
    let workbook = XlsxReader::read(&bytes).unwrap();
    let copy = sheet(&workbook, "DataSet");

    assert_eq!(copy.rows(), original.rows());
    assert_eq!(copy.dimension_ref(), original.dimension_ref());
}

#[test]
fn test_leading_blank_rows_keep_positions() {
    let mut ws = Worksheet::new("Sparse");
    ws.set_cell_value("C3", "third").unwrap();
    let bytes = XlsxWriter::write_worksheet(&ws, &WriteOptions::default()).unwrap();

    let workbook = XlsxReader::read(&bytes).unwrap();
    let read_back = sheet(&workbook, "Sparse");
    assert_eq!(read_back.dimension_ref(), "A1:C3");
    assert_eq!(cell(read_back, "C3"), CellValue::from("third"));
}

#[test]
fn test_escape_lookalike_text_roundtrip() {
    let texts = ["FG_x0041_B", "a\r\nb", "snake_x005f_case", "_x0041_x0042_"];
    let rows: Vec<Vec<SheetCell>> = vec![texts
        .iter()
        .map(|text| SheetCell::new(*text, CellStyle::General))
        .collect()];
    let bytes = XlsxWriter::write_sheet(&rows, &WriteOptions::default()).unwrap();
    let workbook = XlsxReader::read(&bytes).unwrap();

    let read_back: Vec<CellValue> = sheet(&workbook, "Sheet1").rows()[0].clone();
    let expected: Vec<CellValue> = texts.iter().map(|text| CellValue::from(*text)).collect();
    assert_eq!(read_back, expected);
}

#[test]
fn test_empty_strings_stay_typed_strings() {
    let rows = vec![vec![
        SheetCell::new("x", CellStyle::General),
        SheetCell::empty(),
        SheetCell::new("", CellStyle::Currency),
    ]];
    let bytes = XlsxWriter::write_sheet(&rows, &WriteOptions::default()).unwrap();

    let archive = ZipArchive::new(&bytes).unwrap();
    let xml = String::from_utf8(archive.read_by_name("xl/worksheets/sheet1.xml").unwrap()).unwrap();
    assert!(xml.contains(r#"<c r="B1" t="inlineStr"><is><t></t></is></c>"#));
    assert!(xml.contains(r#"<c r="C1" t="inlineStr" s="3"><is><t></t></is></c>"#));

    let workbook = XlsxReader::read(&bytes).unwrap();
    let ws = sheet(&workbook, "Sheet1");
    assert_eq!(ws.dimension_ref(), "A1:C1");
    assert_eq!(cell(ws, "B1"), CellValue::empty());
    assert_eq!(cell(ws, "C1"), CellValue::empty());
}
