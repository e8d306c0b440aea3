//! Common utilities for E2E tests.

use std::path::{Path, PathBuf};

use fortisku_core::{CellValue, Workbook, Worksheet};
use fortisku_xlsx::XlsxReader;
use fortisku_zip::{ArchiveFile, ZipArchive};

/// Path of a file in `tests/fixtures/`
pub fn fixture_path(filename: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

pub fn load_fixture(filename: &str) -> Vec<u8> {
    let path = fixture_path(filename);
    std::fs::read(&path).unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e))
}

/// The catalog fixture, decoded with default options
pub fn read_catalog() -> Workbook {
    XlsxReader::read(&load_fixture("catalog.xlsx")).expect("catalog.xlsx should decode")
}

pub fn sheet<'a>(workbook: &'a Workbook, name: &str) -> &'a Worksheet {
    workbook
        .worksheet_by_name(name)
        .unwrap_or_else(|| panic!("sheet '{}' not found", name))
}

/// Value at an A1 reference; out-of-range cells read as empty
pub fn cell(worksheet: &Worksheet, address: &str) -> CellValue {
    worksheet
        .get_value(address)
        .expect("valid address")
        .cloned()
        .unwrap_or_default()
}

/// Offset of the first data byte of `name` inside the archive
pub fn payload_offset(bytes: &[u8], name: &str) -> usize {
    let archive = ZipArchive::new(bytes).expect("valid archive");
    let entry = archive.by_name(name).expect("entry present");
    let header = entry.local_header_offset as usize;
    let name_len = u16::from_le_bytes([bytes[header + 26], bytes[header + 27]]) as usize;
    let extra_len = u16::from_le_bytes([bytes[header + 28], bytes[header + 29]]) as usize;
    header + 30 + name_len + extra_len
}

/// A package assembled from literal parts, for structural edge cases
pub fn package(parts: &[(&str, &str)]) -> Vec<u8> {
    let files: Vec<ArchiveFile> = parts
        .iter()
        .map(|(name, xml)| ArchiveFile::new(*name, xml.as_bytes().to_vec()))
        .collect();
    fortisku_zip::zip(&files).expect("package fits in a zip")
}

pub const WORKBOOK_RELS_ONE_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

pub fn workbook_xml(sheet_names: &[&str]) -> String {
    let sheets: String = sheet_names
        .iter()
        .enumerate()
        .map(|(i, name)| format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, name, i + 1, i + 1))
        .collect();
    format!(
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
        sheets
    )
}
