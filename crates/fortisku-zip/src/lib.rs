//! # fortisku-zip
//!
//! A self-contained ZIP codec: a reader for stored and deflated entries
//! (with its own RFC 1951 inflater) and a store-only writer.
//!
//! ```rust
//! use fortisku_zip::{unzip, zip, ArchiveFile};
//!
//! let bytes = zip(&[ArchiveFile::new("hello.txt", b"hello".to_vec())]).unwrap();
//! let files = unzip(&bytes).unwrap();
//! assert_eq!(files[0].name, "hello.txt");
//! assert_eq!(files[0].data, b"hello");
//! ```

mod bits;
pub mod crc32;
pub mod error;
mod huffman;
pub mod inflate;
pub mod reader;
pub mod writer;

pub use bits::BitCursor;
pub use crc32::{crc32, Crc32};
pub use error::{ErrorKind, InflateError, InflateResult, ZipError, ZipResult};
pub use inflate::inflate;
pub use reader::{unzip, CompressionMethod, ReadOptions, ZipArchive, ZipEntry};
pub use writer::{zip, ZipWriter};

/// A named blob, the unit both [`zip`] and [`unzip`] work in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl ArchiveFile {
    pub fn new<N: Into<String>, D: Into<Vec<u8>>>(name: N, data: D) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}
