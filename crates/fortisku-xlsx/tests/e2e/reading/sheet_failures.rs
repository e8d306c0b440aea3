//! Per-sheet failure handling and container damage.

use crate::common::*;
use fortisku_xlsx::{ReadOptions, SheetErrorPolicy, XlsxError, XlsxReader};
use fortisku_zip::{ErrorKind, ZipError};
use pretty_assertions::assert_eq;

/// The catalog with one byte of the DataSet part flipped
fn damaged_catalog() -> Vec<u8> {
    let mut bytes = load_fixture("catalog.xlsx");
    let offset = payload_offset(&bytes, "xl/worksheets/sheet1.xml");
    bytes[offset + 40] ^= 0x55;
    bytes
}

#[test]
fn test_damaged_sheet_aborts_by_default() {
    let err = XlsxReader::read(&damaged_catalog()).unwrap_err();
    match err {
        XlsxError::Sheet { ref sheet, .. } => assert_eq!(sheet, "DataSet"),
        other => panic!("expected a sheet error, got {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_damaged_sheet_is_skipped_and_recorded() {
    let options = ReadOptions {
        sheet_errors: SheetErrorPolicy::Skip,
        ..ReadOptions::default()
    };
    let workbook = XlsxReader::read_with_options(&damaged_catalog(), &options).unwrap();

    assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["Cover Sheet", "Notes"]);
    let failures = workbook.failed_sheets();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, "DataSet");
    assert!(!failures[0].message.is_empty());
}

#[test]
fn test_crc_mismatch_is_detected() {
    let mut bytes = load_fixture("catalog.xlsx");
    // Corrupt the stored CRC of the notes part in its central directory record
    let archive = fortisku_zip::ZipArchive::new(&bytes).unwrap();
    let crc = archive.by_name("xl/worksheets/notes.xml").unwrap().crc32;
    let needle = crc.to_le_bytes();
    let central = bytes
        .windows(4)
        .rposition(|w| w == needle)
        .expect("central directory copy of the CRC");
    bytes[central] ^= 0xFF;

    let err = XlsxReader::read(&bytes).unwrap_err();
    match err {
        XlsxError::Sheet { ref source, .. } => {
            assert!(matches!(**source, XlsxError::Zip(ZipError::CrcMismatch { .. })))
        }
        other => panic!("expected a sheet error, got {:?}", other),
    }

    let lenient = ReadOptions {
        verify_crc: false,
        ..ReadOptions::default()
    };
    let workbook = XlsxReader::read_with_options(&bytes, &lenient).unwrap();
    assert_eq!(workbook.sheet_count(), 3);
}

#[test]
fn test_truncated_archive() {
    let bytes = load_fixture("catalog.xlsx");
    let err = XlsxReader::read(&bytes[..bytes.len() / 2]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

/// A one-cell sheet whose only cell sits in the last row and column
fn far_corner_package() -> Vec<u8> {
    let workbook = workbook_xml(&["Small", "Far"]);
    package(&[
        ("xl/workbook.xml", workbook.as_str()),
        (
            "xl/worksheets/sheet1.xml",
            r#"<worksheet><sheetData><row r="1"><c r="A1"><v>1</v></c></row></sheetData></worksheet>"#,
        ),
        (
            "xl/worksheets/sheet2.xml",
            r#"<worksheet><sheetData><row r="1048576"><c r="XFD1048576"><v>1</v></c></row></sheetData></worksheet>"#,
        ),
    ])
}

#[test]
fn test_far_corner_cell_is_rejected_not_allocated() {
    let err = XlsxReader::read(&far_corner_package()).unwrap_err();
    match err {
        XlsxError::Sheet { ref sheet, ref source } => {
            assert_eq!(sheet, "Far");
            assert!(matches!(**source, XlsxError::SheetTooLarge { .. }));
        }
        ref other => panic!("expected a sheet error, got {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_oversized_sheet_is_skipped_and_recorded() {
    let options = ReadOptions {
        sheet_errors: SheetErrorPolicy::Skip,
        ..ReadOptions::default()
    };
    let workbook = XlsxReader::read_with_options(&far_corner_package(), &options).unwrap();

    assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["Small"]);
    assert_eq!(workbook.failed_sheets().len(), 1);
    assert_eq!(workbook.failed_sheets()[0].name, "Far");
}
