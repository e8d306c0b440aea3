//! XLSX reader

mod sheet;

use ahash::AHashMap;
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::options::{ReadOptions, SheetErrorPolicy};
use fortisku_core::Workbook;
use fortisku_zip::ZipArchive;

pub(crate) const WORKBOOK_PART: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub(crate) const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this form for characters XML cannot carry directly:
/// - `_x000d_` = CR
/// - `_x000a_` = LF
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (an escaped escape)
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("_x") {
        result.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Resolve a relationship target against the part that owns the relationship.
///
/// A leading `/` makes the target package-absolute; otherwise it is relative
/// to the owner's directory. `.` segments are dropped and `..` pops one.
pub(crate) fn resolve_path(owner_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let relative = match target.strip_prefix('/') {
        Some(absolute) => absolute,
        None => {
            if let Some((dir, _)) = owner_part.rsplit_once('/') {
                segments.extend(dir.split('/').filter(|s| !s.is_empty()));
            }
            target
        }
    };
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// A `<sheet>` entry of the workbook part
#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetRef {
    name: String,
    rel_id: Option<String>,
}

/// XLSX reader
pub struct XlsxReader;

impl XlsxReader {
    /// Decode a workbook from the bytes of an `.xlsx` file
    pub fn read(bytes: &[u8]) -> XlsxResult<Workbook> {
        Self::read_with_options(bytes, &ReadOptions::default())
    }

    /// Decode a workbook with explicit CRC and per-sheet failure handling
    pub fn read_with_options(bytes: &[u8], options: &ReadOptions) -> XlsxResult<Workbook> {
        let archive = ZipArchive::with_options(bytes, options.zip_options())?;

        let workbook_xml = read_part(&archive, WORKBOOK_PART)?
            .ok_or_else(|| XlsxError::MissingPart(WORKBOOK_PART.into()))?;
        let sheets = Self::read_workbook_xml(&workbook_xml)?;

        let rels = match read_part(&archive, WORKBOOK_RELS_PART)? {
            Some(xml) => Self::read_workbook_rels(&xml)?,
            None => AHashMap::new(),
        };

        let shared_strings = match read_part(&archive, SHARED_STRINGS_PART)? {
            Some(xml) => Self::read_shared_strings(&xml)?,
            None => Vec::new(),
        };
        debug!(
            "workbook lists {} sheets, {} relationships, {} shared strings",
            sheets.len(),
            rels.len(),
            shared_strings.len()
        );

        let mut workbook = Workbook::new();
        for (position, sheet) in sheets.iter().enumerate() {
            let path = sheet
                .rel_id
                .as_ref()
                .and_then(|id| rels.get(id))
                .cloned()
                .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", position + 1));

            let Some(entry) = archive.by_name(&path) else {
                warn!(
                    "worksheet part '{}' for sheet '{}' is missing, skipped",
                    path, sheet.name
                );
                continue;
            };

            let loaded = archive
                .read(entry)
                .map_err(XlsxError::from)
                .and_then(|xml| {
                    sheet::read_worksheet(&sheet.name, &xml, &shared_strings, options.max_cells)
                })
                .and_then(|ws| Ok(workbook.add_worksheet(ws)?));
            match (loaded, options.sheet_errors) {
                (Ok(_), _) => {}
                (Err(err), SheetErrorPolicy::Abort) => {
                    return Err(XlsxError::Sheet {
                        sheet: sheet.name.clone(),
                        source: Box::new(err),
                    })
                }
                (Err(err), SheetErrorPolicy::Skip) => {
                    warn!("sheet '{}' skipped: {}", sheet.name, err);
                    workbook.record_failure(sheet.name.as_str(), err.to_string());
                }
            }
        }

        if workbook.is_empty() {
            return Err(XlsxError::NoWorksheets);
        }
        Ok(workbook)
    }

    /// Sheet names and relationship ids from `xl/workbook.xml`, in document order
    fn read_workbook_xml(xml: &[u8]) -> XlsxResult<Vec<SheetRef>> {
        let mut xml_reader = Reader::from_reader(xml);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut rel_id = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"name" => name = Some(attr.unescape_value()?.into_owned()),
                            // r:id; the prefix varies between producers
                            b"id" if attr.key.prefix().is_some() => {
                                rel_id = Some(attr.unescape_value()?.into_owned())
                            }
                            _ => {}
                        }
                    }
                    match name {
                        Some(name) => sheets.push(SheetRef { name, rel_id }),
                        None => warn!("<sheet> without a name attribute ignored"),
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Relationship id to resolved part path, from `xl/_rels/workbook.xml.rels`
    fn read_workbook_rels(xml: &[u8]) -> XlsxResult<AHashMap<String, String>> {
        let mut xml_reader = Reader::from_reader(xml);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = AHashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut external = false;
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"Id" => id = Some(attr.unescape_value()?.into_owned()),
                            b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                            b"TargetMode" => external = attr.value.as_ref() == b"External",
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target), false) = (id, target, external) {
                        rels.insert(id, resolve_path(WORKBOOK_PART, &target));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// The shared-string table; each `<si>` joins the text of all its runs
    fn read_shared_strings(xml: &[u8]) -> XlsxResult<Vec<String>> {
        let mut xml_reader = Reader::from_reader(xml);
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut strings = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => current.push_str(&e.unescape()?),
                Ok(Event::CData(e)) if in_t => current.push_str(&utf8(SHARED_STRINGS_PART, &e)?),
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }
}

/// Read an optional part; `None` when the archive has no such entry
fn read_part(archive: &ZipArchive<'_>, name: &str) -> XlsxResult<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Some(entry) => Ok(Some(archive.read(entry)?)),
        None => Ok(None),
    }
}

pub(crate) fn utf8<'a>(part: &str, bytes: &'a [u8]) -> XlsxResult<&'a str> {
    std::str::from_utf8(bytes).map_err(|source| XlsxError::Utf8 {
        part: part.to_string(),
        source,
    })
}
