//! XLSX writer

use std::fmt::Write;

use log::debug;

use crate::error::XlsxResult;
use crate::options::WriteOptions;
use crate::styles::{to_styles_xml, CellStyle};
use fortisku_core::{col_ref, CellValue, Worksheet};
use fortisku_zip::ZipWriter;

pub(crate) const WORKSHEET_PART: &str = "xl/worksheets/sheet1.xml";
pub(crate) const STYLES_PART: &str = "xl/styles.xml";

/// One cell of a sheet to be written: a value plus the format it displays with
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetCell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl SheetCell {
    pub fn new<V: Into<CellValue>>(value: V, style: CellStyle) -> Self {
        Self {
            value: value.into(),
            style,
        }
    }

    /// An empty inline string
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<CellValue> for SheetCell {
    fn from(value: CellValue) -> Self {
        Self {
            value,
            style: CellStyle::General,
        }
    }
}

/// XLSX file writer.
///
/// Produces a single-sheet workbook: row `i` of the input becomes sheet row
/// `i + 1` and cell `j` lands in column `col_ref(j + 1)`, so formulas built
/// from those coordinates point at the intended cells. Formulas are stored as
/// text and left for the spreadsheet application to evaluate.
pub struct XlsxWriter;

impl XlsxWriter {
    /// Encode styled rows as the bytes of an `.xlsx` file
    pub fn write_sheet(rows: &[Vec<SheetCell>], options: &WriteOptions) -> XlsxResult<Vec<u8>> {
        if options.sheet_name.trim().is_empty() {
            return Err(fortisku_core::Error::InvalidSheetName(options.sheet_name.clone()).into());
        }

        let mut zip = ZipWriter::new();
        zip.add("[Content_Types].xml", Self::content_types_xml(options).as_bytes())?;
        zip.add("_rels/.rels", ROOT_RELS_XML.as_bytes())?;
        zip.add("xl/workbook.xml", Self::workbook_xml(&options.sheet_name).as_bytes())?;
        zip.add("xl/_rels/workbook.xml.rels", Self::workbook_rels_xml(options).as_bytes())?;
        if options.include_styles {
            zip.add(STYLES_PART, to_styles_xml().as_bytes())?;
        }
        zip.add(WORKSHEET_PART, Self::worksheet_xml(rows, options).as_bytes())?;

        let bytes = zip.finish()?;
        debug!(
            "wrote sheet '{}' with {} rows ({} bytes)",
            options.sheet_name,
            rows.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Encode a decoded worksheet unstyled, under its own name
    pub fn write_worksheet(worksheet: &Worksheet, options: &WriteOptions) -> XlsxResult<Vec<u8>> {
        let rows: Vec<Vec<SheetCell>> = worksheet
            .rows()
            .iter()
            .map(|row| row.iter().cloned().map(SheetCell::from).collect())
            .collect();
        let options = WriteOptions {
            sheet_name: worksheet.name().to_string(),
            ..options.clone()
        };
        Self::write_sheet(&rows, &options)
    }

    fn content_types_xml(options: &WriteOptions) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        );
        if options.include_styles {
            xml.push_str(
                r#"
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            );
        }
        xml.push_str("\n</Types>");
        xml
    }

    fn workbook_xml(sheet_name: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="{}" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#,
            escape_xml(sheet_name)
        )
    }

    fn workbook_rels_xml(options: &WriteOptions) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
        );
        if options.include_styles {
            xml.push_str(
                r#"
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            );
        }
        xml.push_str("\n</Relationships>");
        xml
    }

    fn worksheet_xml(rows: &[Vec<SheetCell>], options: &WriteOptions) -> String {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let height = rows.len().max(1);

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );
        let _ = write!(
            xml,
            "\n  <dimension ref=\"A1:{}{}\"/>",
            col_ref(width as u32),
            height
        );
        xml.push_str("\n  <sheetViews><sheetView workbookViewId=\"0\"/></sheetViews>");
        xml.push_str("\n  <sheetFormatPr defaultRowHeight=\"15\"/>");
        xml.push_str("\n  <sheetData>");

        for (row_idx, row) in rows.iter().enumerate() {
            let row_num = row_idx + 1;
            let _ = write!(xml, "\n    <row r=\"{}\">", row_num);
            for (col_idx, cell) in row.iter().enumerate() {
                let reference = format!("{}{}", col_ref(col_idx as u32 + 1), row_num);
                // Style indices only resolve when styles.xml is present
                let style = if options.include_styles {
                    cell.style
                } else {
                    CellStyle::General
                };
                write_cell(&mut xml, &reference, &cell.value, style);
            }
            xml.push_str("</row>");
        }

        xml.push_str("\n  </sheetData>\n</worksheet>");
        xml
    }
}

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

fn write_cell(xml: &mut String, reference: &str, value: &CellValue, style: CellStyle) {
    let style_attr = match style {
        CellStyle::General => String::new(),
        other => format!(" s=\"{}\"", other.index()),
    };

    match value {
        CellValue::String(s) => {
            let space = if s.trim() != s { " xml:space=\"preserve\"" } else { "" };
            let _ = write!(
                xml,
                "<c r=\"{}\" t=\"inlineStr\"{}><is><t{}>{}</t></is></c>",
                reference,
                style_attr,
                space,
                escape_xml(&encode_excel_escapes(s))
            );
        }
        CellValue::Number(n) => {
            let _ = write!(xml, "<c r=\"{}\"{}><v>{}</v></c>", reference, style_attr, format_number(*n));
        }
        CellValue::Boolean(b) => {
            let _ = write!(
                xml,
                "<c r=\"{}\" t=\"b\"{}><v>{}</v></c>",
                reference,
                style_attr,
                if *b { 1 } else { 0 }
            );
        }
        CellValue::Formula { text, cached } => {
            let (type_attr, cached_xml) = match cached.as_deref() {
                Some(CellValue::Number(n)) => ("", format!("<v>{}</v>", format_number(*n))),
                Some(CellValue::Boolean(b)) => (" t=\"b\"", format!("<v>{}</v>", if *b { 1 } else { 0 })),
                Some(CellValue::String(s)) if !s.is_empty() => {
                    (" t=\"str\"", format!("<v>{}</v>", escape_xml(&encode_excel_escapes(s))))
                }
                _ => ("", String::new()),
            };
            let _ = write!(
                xml,
                "<c r=\"{}\"{}{}><f>{}</f>{}</c>",
                reference,
                type_attr,
                style_attr,
                escape_xml(text),
                cached_xml
            );
        }
    }
}

/// Non-finite numbers have no XML form and are written as 0
fn format_number(n: f64) -> String {
    if n.is_finite() {
        n.to_string()
    } else {
        "0".to_string()
    }
}

/// Write the `_` of every literal `_xHHHH_` run as `_x005F_`, so the text
/// is not read back as an Excel character escape
pub(crate) fn encode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len() + 6);
    let mut rest = s;
    while let Some(start) = rest.find("_x") {
        result.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let is_escape = candidate
            .get(2..6)
            .map_or(false, |hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            && candidate.as_bytes().get(6) == Some(&b'_');
        result.push_str(if is_escape { "_x005F_" } else { "_" });
        rest = &candidate[1..];
    }
    result.push_str(rest);
    result
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
