//! Error types for fortisku-zip

use thiserror::Error;

/// Result type for DEFLATE decoding
pub type InflateResult<T> = std::result::Result<T, InflateError>;

/// Result type for archive operations
pub type ZipResult<T> = std::result::Result<T, ZipError>;

/// Coarse classification shared by every error in the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Structurally malformed input (missing record, bad signature, truncation)
    Format,
    /// Well-formed input using a feature outside the supported set
    Unsupported,
    /// Compressed data that does not decode, or decodes to the wrong bytes
    Decode,
}

/// Errors raised while decoding a raw DEFLATE stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InflateError {
    /// Ran out of input in the middle of a block
    #[error("unexpected end of deflate stream")]
    StreamExhausted,

    /// A code-length table that cannot form a prefix code
    #[error("invalid code lengths: {0}")]
    InvalidCodeLengths(&'static str),

    /// A bit sequence with no symbol, or a symbol outside its alphabet
    #[error("invalid Huffman code")]
    InvalidSymbol,

    /// Back-reference reaching before the start of the output
    #[error("back-reference distance {distance} exceeds {available} bytes of output")]
    DistanceTooFar { distance: usize, available: usize },

    /// Stored block whose NLEN is not the complement of LEN
    #[error("stored block length {len:#06x} does not match its complement {nlen:#06x}")]
    StoredLengthMismatch { len: u16, nlen: u16 },

    /// Block type 3
    #[error("reserved block type")]
    ReservedBlockType,

    /// Output grew past the size the caller declared
    #[error("inflated output exceeds the declared {0} bytes")]
    OutputTooLarge(usize),
}

impl InflateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InflateError::StreamExhausted => ErrorKind::Format,
            InflateError::ReservedBlockType => ErrorKind::Unsupported,
            _ => ErrorKind::Decode,
        }
    }
}

/// Errors raised while reading or writing an archive
#[derive(Debug, Error)]
pub enum ZipError {
    /// No end-of-central-directory record in the scan window
    #[error("end of central directory record not found")]
    EocdNotFound,

    /// A record does not start with its signature
    #[error("bad {what} signature at offset {offset}")]
    BadSignature { what: &'static str, offset: usize },

    /// A record or payload runs past the end of the buffer
    #[error("archive truncated reading {what} at offset {offset}")]
    Truncated { what: &'static str, offset: usize },

    /// Entry missing from the central directory
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// Compression method other than store (0) or deflate (8)
    #[error("entry '{name}' uses unsupported compression method {method}")]
    UnsupportedCompression { name: String, method: u16 },

    /// Encryption flag set on an entry
    #[error("entry '{0}' is encrypted")]
    Encrypted(String),

    /// ZIP64 sentinel values in the directory
    #[error("ZIP64 archives are not supported")]
    Zip64,

    /// Archive split over several disks
    #[error("multi-disk archives are not supported")]
    MultiDisk,

    /// Entry payload failed to inflate
    #[error("entry '{name}': {source}")]
    Inflate {
        name: String,
        #[source]
        source: InflateError,
    },

    /// Decoded length differs from the declared uncompressed size
    #[error("entry '{name}' decoded to {actual} bytes, expected {expected}")]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    /// Decoded bytes do not match the stored checksum
    #[error("entry '{name}' CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    /// Writer input that does not fit the classic (non-ZIP64) fields
    #[error("{0} too large for a ZIP archive without ZIP64")]
    TooLarge(&'static str),
}

impl ZipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZipError::EocdNotFound
            | ZipError::BadSignature { .. }
            | ZipError::Truncated { .. }
            | ZipError::EntryNotFound(_) => ErrorKind::Format,
            ZipError::UnsupportedCompression { .. }
            | ZipError::Encrypted(_)
            | ZipError::Zip64
            | ZipError::MultiDisk
            | ZipError::TooLarge(_) => ErrorKind::Unsupported,
            ZipError::Inflate { source, .. } => source.kind(),
            ZipError::SizeMismatch { .. } | ZipError::CrcMismatch { .. } => ErrorKind::Decode,
        }
    }
}
