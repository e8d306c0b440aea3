//! Store-only ZIP writer

use crate::crc32::crc32;
use crate::error::{ZipError, ZipResult};
use crate::ArchiveFile;
use log::debug;

const SIG_LOCAL: u32 = 0x0403_4B50;
const SIG_CENTRAL: u32 = 0x0201_4B50;
const SIG_EOCD: u32 = 0x0605_4B50;

/// Version made by / needed to extract: 2.0
const VERSION: u16 = 20;

/// Builds an uncompressed archive in memory.
///
/// Each [`add`](Self::add) appends a local header and the raw bytes;
/// [`finish`](Self::finish) appends the central directory and the EOCD.
#[derive(Debug, Default)]
pub struct ZipWriter {
    buf: Vec<u8>,
    central: Vec<u8>,
    count: usize,
}

impl ZipWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one stored entry
    pub fn add(&mut self, name: &str, data: &[u8]) -> ZipResult<()> {
        let name_len = u16::try_from(name.len()).map_err(|_| ZipError::TooLarge("entry name"))?;
        let size = u32::try_from(data.len()).map_err(|_| ZipError::TooLarge("entry"))?;
        let offset = u32::try_from(self.buf.len()).map_err(|_| ZipError::TooLarge("archive"))?;
        let crc = crc32(data);

        let local = &mut self.buf;
        put_u32(local, SIG_LOCAL);
        put_u16(local, VERSION);
        put_u16(local, 0); // flags
        put_u16(local, 0); // method: store
        put_u16(local, 0); // mod time
        put_u16(local, 0); // mod date
        put_u32(local, crc);
        put_u32(local, size); // compressed
        put_u32(local, size); // uncompressed
        put_u16(local, name_len);
        put_u16(local, 0); // extra
        local.extend_from_slice(name.as_bytes());
        local.extend_from_slice(data);

        let central = &mut self.central;
        put_u32(central, SIG_CENTRAL);
        put_u16(central, VERSION); // made by
        put_u16(central, VERSION); // needed
        put_u16(central, 0);
        put_u16(central, 0);
        put_u16(central, 0);
        put_u16(central, 0);
        put_u32(central, crc);
        put_u32(central, size);
        put_u32(central, size);
        put_u16(central, name_len);
        put_u16(central, 0); // extra
        put_u16(central, 0); // comment
        put_u16(central, 0); // disk start
        put_u16(central, 0); // internal attributes
        put_u32(central, 0); // external attributes
        put_u32(central, offset);
        central.extend_from_slice(name.as_bytes());

        self.count += 1;
        Ok(())
    }

    /// Append the central directory and EOCD, returning the archive bytes
    pub fn finish(self) -> ZipResult<Vec<u8>> {
        let Self {
            mut buf,
            central,
            count,
        } = self;
        let count = u16::try_from(count).map_err(|_| ZipError::TooLarge("entry count"))?;
        let cd_offset = u32::try_from(buf.len()).map_err(|_| ZipError::TooLarge("archive"))?;
        let cd_size =
            u32::try_from(central.len()).map_err(|_| ZipError::TooLarge("central directory"))?;
        if cd_offset.checked_add(cd_size).is_none() {
            return Err(ZipError::TooLarge("archive"));
        }

        buf.extend_from_slice(&central);
        put_u32(&mut buf, SIG_EOCD);
        put_u16(&mut buf, 0); // this disk
        put_u16(&mut buf, 0); // central directory disk
        put_u16(&mut buf, count);
        put_u16(&mut buf, count);
        put_u32(&mut buf, cd_size);
        put_u32(&mut buf, cd_offset);
        put_u16(&mut buf, 0); // comment

        debug!("wrote {} entries, {} bytes", count, buf.len());
        Ok(buf)
    }
}

/// Pack `files` into a store-only archive, in the given order
pub fn zip(files: &[ArchiveFile]) -> ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new();
    for file in files {
        writer.add(&file.name, &file.data)?;
    }
    writer.finish()
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}
