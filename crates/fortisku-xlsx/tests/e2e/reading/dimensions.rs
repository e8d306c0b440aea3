//! Densified shapes and bounding references.

use crate::common::*;
use fortisku_core::CellValue;
use pretty_assertions::assert_eq;

#[test]
fn test_dimension_refs() {
    let workbook = read_catalog();
    assert_eq!(sheet(&workbook, "DataSet").dimension_ref(), "A1:F7");
    assert_eq!(sheet(&workbook, "Cover Sheet").dimension_ref(), "A1:C7");
    assert_eq!(sheet(&workbook, "Notes").dimension_ref(), "A1:C2");
}

#[test]
fn test_missing_row_is_preserved_as_blank() {
    let workbook = read_catalog();
    let data = sheet(&workbook, "DataSet");
    assert_eq!(data.row_count(), 7);
    assert_eq!(data.rows()[3], vec![CellValue::empty(); 6]);
    assert_eq!(cell(data, "A5"), CellValue::from("fc-10-0060f-950-02-12"));
}

#[test]
fn test_every_row_is_full_width() {
    let workbook = read_catalog();
    for worksheet in workbook.worksheets() {
        let width = worksheet.col_count();
        assert!(worksheet.rows().iter().all(|row| row.len() == width), "{}", worksheet.name());
    }
}

#[test]
fn test_cover_sheet_rows_before_c7_are_blank() {
    let workbook = read_catalog();
    let cover = sheet(&workbook, "Cover Sheet");
    assert_eq!(cover.row_count(), 7);
    for row in &cover.rows()[1..6] {
        assert!(row.iter().all(CellValue::is_empty));
    }
}
