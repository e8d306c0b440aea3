//! ZIP archive reader
//!
//! Locates the end-of-central-directory record, indexes the central
//! directory, and extracts stored or deflated entries on demand.

use crate::crc32::crc32;
use crate::error::{ZipError, ZipResult};
use crate::inflate::inflate;
use crate::ArchiveFile;
use ahash::AHashMap;
use log::{debug, trace, warn};

const SIG_LOCAL: u32 = 0x0403_4B50;
const SIG_CENTRAL: u32 = 0x0201_4B50;
const SIG_EOCD: u32 = 0x0605_4B50;
const SIG_ZIP64_LOCATOR: u32 = 0x0706_4B50;
/// The ZIP64 end-of-central-directory locator sits right before the EOCD
const ZIP64_LOCATOR_SIZE: usize = 20;

const LOCAL_HEADER_SIZE: usize = 30;
const CENTRAL_HEADER_SIZE: usize = 46;
const EOCD_MIN_SIZE: usize = 22;
/// The EOCD may be followed by a comment of up to `u16::MAX` bytes
const MAX_EOCD_SCAN: usize = EOCD_MIN_SIZE + u16::MAX as usize;

const FLAG_ENCRYPTED: u16 = 0x0001;

/// How an entry's payload is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Method 0
    Stored,
    /// Method 8
    Deflated,
    /// Anything else; listed, but fails to read
    Other(u16),
}

impl CompressionMethod {
    pub fn from_u16(method: u16) -> Self {
        match method {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflated,
            other => CompressionMethod::Other(other),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflated => 8,
            CompressionMethod::Other(other) => other,
        }
    }
}

/// One central-directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub name: String,
    pub method: CompressionMethod,
    pub flags: u16,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub crc32: u32,
    pub local_header_offset: u32,
}

impl ZipEntry {
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}

/// Options for reading an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Compare each extracted payload against its stored CRC-32
    pub verify_crc: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { verify_crc: true }
    }
}

/// A parsed archive over a borrowed byte buffer.
///
/// Construction reads only the central directory; payloads are located
/// and decoded by [`read`](Self::read).
#[derive(Debug)]
pub struct ZipArchive<'a> {
    data: &'a [u8],
    entries: Vec<ZipEntry>,
    index: AHashMap<String, usize>,
    options: ReadOptions,
}

impl<'a> ZipArchive<'a> {
    pub fn new(data: &'a [u8]) -> ZipResult<Self> {
        Self::with_options(data, ReadOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: ReadOptions) -> ZipResult<Self> {
        let eocd = find_eocd(data)?;
        let disk = le_u16(data, eocd + 4, "end of central directory")?;
        let cd_disk = le_u16(data, eocd + 6, "end of central directory")?;
        let disk_entries = le_u16(data, eocd + 8, "end of central directory")?;
        let total_entries = le_u16(data, eocd + 10, "end of central directory")?;
        let cd_size = le_u32(data, eocd + 12, "end of central directory")?;
        let cd_offset = le_u32(data, eocd + 16, "end of central directory")?;

        // 0xFFFF entries is a legal classic count; only the locator or a
        // saturated size/offset marks a ZIP64 archive
        let zip64_locator = eocd
            .checked_sub(ZIP64_LOCATOR_SIZE)
            .and_then(|pos| le_u32(data, pos, "ZIP64 locator").ok())
            == Some(SIG_ZIP64_LOCATOR);
        if zip64_locator || cd_size == u32::MAX || cd_offset == u32::MAX {
            return Err(ZipError::Zip64);
        }
        if disk != 0 || cd_disk != 0 || disk_entries != total_entries {
            return Err(ZipError::MultiDisk);
        }
        debug!(
            "EOCD at {}: {} entries, central directory {} bytes at {}",
            eocd, total_entries, cd_size, cd_offset
        );

        let mut entries = Vec::with_capacity(total_entries as usize);
        let mut index = AHashMap::with_capacity(total_entries as usize);
        let mut pos = cd_offset as usize;
        for _ in 0..total_entries {
            let (entry, next) = read_central_entry(data, pos)?;
            trace!(
                "entry '{}' method {:?} {} -> {} bytes",
                entry.name,
                entry.method,
                entry.compressed_size,
                entry.uncompressed_size
            );
            index.insert(entry.name.clone(), entries.len());
            entries.push(entry);
            pos = next;
        }

        Ok(Self {
            data,
            entries,
            index,
            options,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Central-directory records in archive order
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// Look up an entry by exact name; with duplicate names the last one wins
    pub fn by_name(&self, name: &str) -> Option<&ZipEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Extract one entry's payload
    pub fn read(&self, entry: &ZipEntry) -> ZipResult<Vec<u8>> {
        if entry.is_encrypted() {
            return Err(ZipError::Encrypted(entry.name.clone()));
        }
        if let CompressionMethod::Other(method) = entry.method {
            return Err(ZipError::UnsupportedCompression {
                name: entry.name.clone(),
                method,
            });
        }

        let raw = self.payload(entry)?;
        let expected = entry.uncompressed_size as usize;
        let data = match entry.method {
            CompressionMethod::Deflated => {
                inflate(raw, Some(expected)).map_err(|source| ZipError::Inflate {
                    name: entry.name.clone(),
                    source,
                })?
            }
            _ => raw.to_vec(),
        };

        if data.len() != expected {
            return Err(ZipError::SizeMismatch {
                name: entry.name.clone(),
                expected: expected as u64,
                actual: data.len() as u64,
            });
        }

        let actual = crc32(&data);
        if actual != entry.crc32 {
            if self.options.verify_crc {
                return Err(ZipError::CrcMismatch {
                    name: entry.name.clone(),
                    expected: entry.crc32,
                    actual,
                });
            }
            warn!(
                "entry '{}' CRC mismatch ({:#010x} != {:#010x}), ignored",
                entry.name, actual, entry.crc32
            );
        }
        Ok(data)
    }

    /// Extract an entry by name
    pub fn read_by_name(&self, name: &str) -> ZipResult<Vec<u8>> {
        let entry = self
            .by_name(name)
            .ok_or_else(|| ZipError::EntryNotFound(name.to_string()))?;
        self.read(entry)
    }

    /// Compressed bytes of an entry, located through its local header
    fn payload(&self, entry: &ZipEntry) -> ZipResult<&'a [u8]> {
        let offset = entry.local_header_offset as usize;
        if le_u32(self.data, offset, "local header")? != SIG_LOCAL {
            return Err(ZipError::BadSignature {
                what: "local header",
                offset,
            });
        }
        let name_len = le_u16(self.data, offset + 26, "local header")? as usize;
        let extra_len = le_u16(self.data, offset + 28, "local header")? as usize;
        let start = offset + LOCAL_HEADER_SIZE + name_len + extra_len;
        slice(
            self.data,
            start,
            entry.compressed_size as usize,
            "entry data",
        )
    }
}

/// Extract every file entry (directories are skipped) in archive order
pub fn unzip(data: &[u8]) -> ZipResult<Vec<ArchiveFile>> {
    let archive = ZipArchive::new(data)?;
    archive
        .entries()
        .iter()
        .filter(|entry| !entry.is_dir())
        .map(|entry| Ok(ArchiveFile::new(entry.name.clone(), archive.read(entry)?)))
        .collect()
}

/// Scan backwards for the EOCD signature, at most a maximal comment away from the end
fn find_eocd(data: &[u8]) -> ZipResult<usize> {
    if data.len() < EOCD_MIN_SIZE {
        return Err(ZipError::EocdNotFound);
    }
    let last = data.len() - EOCD_MIN_SIZE;
    let first = data.len().saturating_sub(MAX_EOCD_SCAN);
    (first..=last)
        .rev()
        .find(|&pos| data[pos..pos + 4] == SIG_EOCD.to_le_bytes())
        .ok_or(ZipError::EocdNotFound)
}

/// Parse the central record at `pos`, returning it and the offset of the next one
fn read_central_entry(data: &[u8], pos: usize) -> ZipResult<(ZipEntry, usize)> {
    const WHAT: &str = "central directory";
    let header = slice(data, pos, CENTRAL_HEADER_SIZE, WHAT)?;
    if le_u32(header, 0, WHAT)? != SIG_CENTRAL {
        return Err(ZipError::BadSignature {
            what: WHAT,
            offset: pos,
        });
    }

    let flags = le_u16(header, 8, WHAT)?;
    let method = le_u16(header, 10, WHAT)?;
    let crc = le_u32(header, 16, WHAT)?;
    let compressed_size = le_u32(header, 20, WHAT)?;
    let uncompressed_size = le_u32(header, 24, WHAT)?;
    let name_len = le_u16(header, 28, WHAT)? as usize;
    let extra_len = le_u16(header, 30, WHAT)? as usize;
    let comment_len = le_u16(header, 32, WHAT)? as usize;
    let local_header_offset = le_u32(header, 42, WHAT)?;

    if compressed_size == u32::MAX
        || uncompressed_size == u32::MAX
        || local_header_offset == u32::MAX
    {
        return Err(ZipError::Zip64);
    }

    let name = slice(data, pos + CENTRAL_HEADER_SIZE, name_len, "entry name")?;
    let entry = ZipEntry {
        name: String::from_utf8_lossy(name).into_owned(),
        method: CompressionMethod::from_u16(method),
        flags,
        compressed_size,
        uncompressed_size,
        crc32: crc,
        local_header_offset,
    };
    let next = pos + CENTRAL_HEADER_SIZE + name_len + extra_len + comment_len;
    Ok((entry, next))
}

fn slice<'d>(data: &'d [u8], offset: usize, len: usize, what: &'static str) -> ZipResult<&'d [u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(ZipError::Truncated { what, offset })
}

fn le_u16(data: &[u8], offset: usize, what: &'static str) -> ZipResult<u16> {
    let bytes = slice(data, offset, 2, what)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn le_u32(data: &[u8], offset: usize, what: &'static str) -> ZipResult<u32> {
    let bytes = slice(data, offset, 4, what)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::writer::zip;

    fn sample() -> Vec<u8> {
        zip(&[
            ArchiveFile::new("[Content_Types].xml", b"<Types/>".to_vec()),
            ArchiveFile::new("xl/workbook.xml", b"<workbook/>".to_vec()),
        ])
        .unwrap()
    }

    #[test]
    fn test_entries_listing() {
        let bytes = sample();
        let archive = ZipArchive::new(&bytes).unwrap();
        assert_eq!(archive.len(), 2);
        let entry = archive.by_name("xl/workbook.xml").unwrap();
        assert_eq!(entry.method, CompressionMethod::Stored);
        assert_eq!(entry.uncompressed_size, 11);
        assert_eq!(entry.crc32, crc32(b"<workbook/>"));
        assert_eq!(archive.read(entry).unwrap(), b"<workbook/>");
        assert!(!archive.contains("xl/styles.xml"));
    }

    #[test]
    fn test_full_classic_entry_count_is_not_zip64() {
        let files: Vec<ArchiveFile> = (0..u16::MAX as usize)
            .map(|i| ArchiveFile::new(format!("{:05}", i), Vec::new()))
            .collect();
        let bytes = zip(&files).unwrap();
        let archive = ZipArchive::new(&bytes).unwrap();
        assert_eq!(archive.len(), 65535);
        assert!(archive.contains("65534"));
    }

    #[test]
    fn test_zip64_locator_is_unsupported() {
        let bytes = sample();
        let eocd = find_eocd(&bytes).unwrap();
        let mut patched = bytes[..eocd].to_vec();
        patched.extend_from_slice(&SIG_ZIP64_LOCATOR.to_le_bytes());
        patched.extend_from_slice(&[0u8; ZIP64_LOCATOR_SIZE - 4]);
        patched.extend_from_slice(&bytes[eocd..]);

        let err = ZipArchive::new(&patched).unwrap_err();
        assert!(matches!(err, ZipError::Zip64));
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_not_a_zip() {
        let err = ZipArchive::new(b"definitely not a zip archive at all").unwrap_err();
        assert!(matches!(err, ZipError::EocdNotFound));
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(matches!(ZipArchive::new(&[]), Err(ZipError::EocdNotFound)));
    }

    #[test]
    fn test_eocd_found_behind_comment() {
        let mut bytes = sample();
        let comment = vec![b'x'; 300];
        let len = bytes.len();
        bytes[len - 2..].copy_from_slice(&(comment.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&comment);
        let archive = ZipArchive::new(&bytes).unwrap();
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_bad_central_signature() {
        let mut bytes = sample();
        let len = bytes.len();
        let cd_offset = u32::from_le_bytes(bytes[len - 6..len - 2].try_into().unwrap()) as usize;
        bytes[cd_offset] = 0;
        assert!(matches!(
            ZipArchive::new(&bytes),
            Err(ZipError::BadSignature { what: "central directory", .. })
        ));
    }

    #[test]
    fn test_bad_local_signature() {
        let mut bytes = sample();
        bytes[0] = 0;
        let archive = ZipArchive::new(&bytes).unwrap();
        let err = archive.read_by_name("[Content_Types].xml").unwrap_err();
        assert!(matches!(err, ZipError::BadSignature { what: "local header", offset: 0 }));
    }

    #[test]
    fn test_crc_mismatch() {
        let mut bytes = sample();
        // first payload byte follows the 30-byte header and 19-byte name
        bytes[30 + 19] = b'X';
        let archive = ZipArchive::new(&bytes).unwrap();
        let err = archive.read_by_name("[Content_Types].xml").unwrap_err();
        assert!(matches!(err, ZipError::CrcMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::Decode);

        let lenient = ZipArchive::with_options(&bytes, ReadOptions { verify_crc: false }).unwrap();
        assert_eq!(lenient.read_by_name("[Content_Types].xml").unwrap(), b"XTypes/>");
    }

    #[test]
    fn test_unsupported_method() {
        let mut bytes = sample();
        let len = bytes.len();
        let cd_offset = u32::from_le_bytes(bytes[len - 6..len - 2].try_into().unwrap()) as usize;
        // bzip2 on the first central record
        bytes[cd_offset + 10] = 12;
        let archive = ZipArchive::new(&bytes).unwrap();
        let entry = &archive.entries()[0];
        assert_eq!(entry.method, CompressionMethod::Other(12));
        let err = archive.read(entry).unwrap_err();
        assert!(matches!(err, ZipError::UnsupportedCompression { method: 12, .. }));
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_encrypted_entry() {
        let mut bytes = sample();
        let len = bytes.len();
        let cd_offset = u32::from_le_bytes(bytes[len - 6..len - 2].try_into().unwrap()) as usize;
        bytes[cd_offset + 8] |= 1;
        let archive = ZipArchive::new(&bytes).unwrap();
        assert!(matches!(
            archive.read(&archive.entries()[0]),
            Err(ZipError::Encrypted(_))
        ));
    }

    #[test]
    fn test_truncated_archive() {
        let bytes = sample();
        let len = bytes.len();
        // keep the EOCD but drop the bytes the central directory points into
        let mut cut = bytes[..30].to_vec();
        cut.extend_from_slice(&bytes[len - 22..]);
        assert!(matches!(
            ZipArchive::new(&cut),
            Err(ZipError::Truncated { .. })
        ));
    }

    #[test]
    fn test_missing_entry() {
        let bytes = sample();
        let archive = ZipArchive::new(&bytes).unwrap();
        assert!(matches!(
            archive.read_by_name("xl/sharedStrings.xml"),
            Err(ZipError::EntryNotFound(_))
        ));
    }
}
