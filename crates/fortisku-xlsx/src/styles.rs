//! The fixed style sheet (`xl/styles.xml`) shared by every written workbook

use std::fmt::Write;

/// Custom number formats, by id (ids below 164 are built in)
const NUMBER_FORMATS: [(u32, &str); 3] = [(164, "$#,##0.00"), (165, "0.00%"), (166, "0")];

/// Cell format a written cell refers to through its `s` attribute.
///
/// The discriminant is the index into `cellXfs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CellStyle {
    /// Default format; emitted without an `s` attribute
    #[default]
    General = 0,
    /// Left-aligned header text
    Header = 1,
    /// Whole numbers (`0`)
    Integer = 2,
    /// Dollar amounts (`$#,##0.00`)
    Currency = 3,
    /// Fractions shown as percentages (`0.00%`)
    Percent = 4,
}

impl CellStyle {
    pub const ALL: [CellStyle; 5] = [
        CellStyle::General,
        CellStyle::Header,
        CellStyle::Integer,
        CellStyle::Currency,
        CellStyle::Percent,
    ];

    /// Index into `cellXfs`
    pub fn index(self) -> u32 {
        self as u32
    }

    fn num_fmt_id(self) -> u32 {
        match self {
            CellStyle::General | CellStyle::Header => 0,
            CellStyle::Currency => 164,
            CellStyle::Percent => 165,
            CellStyle::Integer => 166,
        }
    }
}

pub(crate) fn to_styles_xml() -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    let _ = write!(xml, "\n  <numFmts count=\"{}\">", NUMBER_FORMATS.len());
    for (id, code) in NUMBER_FORMATS {
        let _ = write!(
            xml,
            "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
            id, code
        );
    }
    xml.push_str("\n  </numFmts>");

    xml.push_str(
        r#"
  <fonts count="1"><font><sz val="11"/><color rgb="FF000000"/><name val="Calibri"/><family val="2"/></font></fonts>
  <fills count="1"><fill><patternFill patternType="none"/></fill></fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    );

    let _ = write!(xml, "\n  <cellXfs count=\"{}\">", CellStyle::ALL.len());
    for style in CellStyle::ALL {
        let num_fmt = style.num_fmt_id();
        let _ = write!(
            xml,
            "\n    <xf numFmtId=\"{}\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"",
            num_fmt
        );
        match style {
            CellStyle::Header => {
                xml.push_str(r#" applyFont="1"><alignment horizontal="left"/></xf>"#)
            }
            _ if num_fmt != 0 => xml.push_str(r#" applyNumberFormat="1"/>"#),
            _ => xml.push_str("/>"),
        }
    }
    xml.push_str("\n  </cellXfs>\n</styleSheet>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_indices() {
        let indices: Vec<u32> = CellStyle::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_styles_xml_lists_formats_in_xf_order() {
        let xml = to_styles_xml();
        assert!(xml.contains(r#"<numFmt numFmtId="164" formatCode="$#,##0.00"/>"#));
        assert!(xml.contains(r#"<cellXfs count="5">"#));

        let xfs: Vec<&str> = xml.match_indices("<xf ").map(|(i, _)| &xml[i..]).collect();
        assert_eq!(xfs.len(), 5);
        assert!(xfs[1].starts_with(r#"<xf numFmtId="0""#));
        assert!(xfs[1].contains(r#"<alignment horizontal="left"/>"#));
        assert!(xfs[2].starts_with(r#"<xf numFmtId="166""#));
        assert!(xfs[3].starts_with(r#"<xf numFmtId="164""#));
        assert!(xfs[4].starts_with(r#"<xf numFmtId="165""#));
    }
}
