//! Sheet listing and part resolution.

use crate::common::*;
use fortisku_core::CellValue;
use fortisku_xlsx::{XlsxError, XlsxReader};
use fortisku_zip::ErrorKind;
use pretty_assertions::assert_eq;

#[test]
fn test_sheets_in_workbook_order() {
    let workbook = read_catalog();
    // "Missing" has no relationship and no default part, so it is skipped
    assert_eq!(
        workbook.sheet_names().collect::<Vec<_>>(),
        vec!["Cover Sheet", "DataSet", "Notes"]
    );
    assert!(workbook.failed_sheets().is_empty());
}

#[test]
fn test_absolute_and_dotted_targets_resolve() {
    let workbook = read_catalog();
    assert_eq!(cell(sheet(&workbook, "Cover Sheet"), "A1"), CellValue::from("FortiSKU"));
    assert_eq!(cell(sheet(&workbook, "Notes"), "B1"), CellValue::Number(1000.0));
}

#[test]
fn test_rich_text_shared_strings_are_joined() {
    let workbook = read_catalog();
    let data = sheet(&workbook, "DataSet");
    assert_eq!(cell(data, "A3"), CellValue::from("FG-60F"));
    assert_eq!(cell(data, "B3"), CellValue::from("FortiGate 60F"));
    assert_eq!(cell(data, "E5"), CellValue::from("Support & Services"));
    assert_eq!(
        cell(sheet(&workbook, "Cover Sheet"), "C7"),
        CellValue::from("Q3 2026 Price List")
    );
}

#[test]
fn test_default_part_path_without_relationships() {
    let sheet_xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1"><v>5</v></c></row></sheetData></worksheet>"#;
    let workbook_xml = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheets><sheet name="Only" sheetId="1"/><sheet name="Second" sheetId="2"/></sheets></workbook>"#;
    let bytes = package(&[
        ("xl/workbook.xml", workbook_xml),
        ("xl/worksheets/sheet1.xml", sheet_xml),
        ("xl/worksheets/sheet2.xml", sheet_xml),
    ]);

    let workbook = XlsxReader::read(&bytes).unwrap();
    assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["Only", "Second"]);
    assert_eq!(cell(sheet(&workbook, "Second"), "A1"), CellValue::Number(5.0));
}

#[test]
fn test_missing_workbook_part() {
    let bytes = package(&[("xl/worksheets/sheet1.xml", "<worksheet/>")]);
    let err = XlsxReader::read(&bytes).unwrap_err();
    assert!(matches!(err, XlsxError::MissingPart(ref part) if part == "xl/workbook.xml"));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_no_loadable_worksheets() {
    let workbook = workbook_xml(&["Ghost"]);
    let bytes = package(&[
        ("xl/workbook.xml", &workbook),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_ONE_SHEET),
    ]);
    let err = XlsxReader::read(&bytes).unwrap_err();
    assert!(matches!(err, XlsxError::NoWorksheets));
    assert_eq!(err.to_string(), "Workbook does not contain any worksheets");
}

#[test]
fn test_shared_strings_are_optional() {
    let workbook = workbook_xml(&["Inline"]);
    let bytes = package(&[
        ("xl/workbook.xml", &workbook),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_ONE_SHEET),
        (
            "xl/worksheets/sheet1.xml",
            r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>solo</t></is></c></row></sheetData></worksheet>"#,
        ),
    ]);
    let workbook = XlsxReader::read(&bytes).unwrap();
    assert_eq!(cell(sheet(&workbook, "Inline"), "A1"), CellValue::from("solo"));
}
