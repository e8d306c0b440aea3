//! A1-style cell addressing and the base-26 column codec

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// Encode a 1-based column index as spreadsheet letters (`1 -> A`, `27 -> AA`).
///
/// Bijective base-26: there is no zero digit, so `Z` is followed by `AA`.
/// Index 0 has no letters and yields an empty string.
pub fn col_ref(index: u32) -> String {
    let mut letters = Vec::new();
    let mut n = index;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    letters.into_iter().map(char::from).collect()
}

/// Decode the leading column letters of a reference into a 1-based index.
///
/// Accepts a bare column (`"AB"`) or a full cell reference (`"AB12"`); only
/// the leading run of ASCII letters is read, case-insensitively.
///
/// ```
/// use fortisku_core::column_index_from_ref;
///
/// assert_eq!(column_index_from_ref("A1").unwrap(), 1);
/// assert_eq!(column_index_from_ref("zz").unwrap(), 702);
/// ```
pub fn column_index_from_ref(reference: &str) -> Result<u32> {
    let letters = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .collect::<Vec<_>>();
    if letters.is_empty() {
        return Err(Error::InvalidAddress(format!(
            "no column letters in '{}'",
            reference
        )));
    }

    let mut index: u32 = 0;
    for b in letters {
        let digit = (b.to_ascii_uppercase() - b'A') as u32 + 1;
        let next = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .filter(|i| *i <= MAX_COLS as u32);
        index = next.ok_or(Error::ColumnOutOfBounds(index, MAX_COLS))?;
    }
    Ok(index)
}

/// A cell address such as `C7`.
///
/// Both coordinates are 0-based internally; `Display` renders the usual
/// 1-based A1 form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based, A=0)
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference.
    ///
    /// ```
    /// use fortisku_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("C7").unwrap();
    /// assert_eq!((addr.row, addr.col), (6, 2));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        if split == 0 {
            return Err(Error::InvalidAddress(format!("no column letters in '{}'", s)));
        }

        let row_str = &s[split..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }
        if row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row - 1, MAX_ROWS - 1));
        }

        let col = column_index_from_ref(&s[..split])?;
        Ok(Self {
            row: row - 1,
            col: (col - 1) as u16,
        })
    }

    /// Convert a 0-based column index to letters (0 = A, 26 = AA)
    pub fn column_to_letters(col: u16) -> String {
        col_ref(col as u32 + 1)
    }

    /// Convert column letters to a 0-based index (A = 0, AA = 26)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.bytes().any(|b| !b.is_ascii_alphabetic()) {
            return Err(Error::InvalidAddress(format!(
                "invalid column letters '{}'",
                letters
            )));
        }
        Ok((column_index_from_ref(letters)? - 1) as u16)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range of cells (e.g. `A1:I4`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner
    pub end: CellAddress,
}

impl CellRange {
    /// Create a range, normalised so `start` is top-left
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Parse `A1:B10`, or a single cell `C3`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((start, end)) => Ok(Self::new(
                CellAddress::parse(start).map_err(|_| Error::InvalidRange(s.into()))?,
                CellAddress::parse(end).map_err(|_| Error::InvalidRange(s.into()))?,
            )),
            None => {
                let addr = CellAddress::parse(s)?;
                Ok(Self::new(addr, addr))
            }
        }
    }

    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// Always `start:end`, even for a single cell, matching worksheet `<dimension>` refs
    pub fn to_a1_string(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_col_ref() {
        assert_eq!(col_ref(1), "A");
        assert_eq!(col_ref(26), "Z");
        assert_eq!(col_ref(27), "AA");
        assert_eq!(col_ref(702), "ZZ");
        assert_eq!(col_ref(703), "AAA");
        assert_eq!(col_ref(16384), "XFD");
        assert_eq!(col_ref(0), "");
    }

    #[test]
    fn test_column_index_from_ref() {
        assert_eq!(column_index_from_ref("A").unwrap(), 1);
        assert_eq!(column_index_from_ref("Z9").unwrap(), 26);
        assert_eq!(column_index_from_ref("AA100").unwrap(), 27);
        assert_eq!(column_index_from_ref("xfd").unwrap(), 16384);

        assert!(column_index_from_ref("").is_err());
        assert!(column_index_from_ref("12").is_err());
        assert!(column_index_from_ref("XFE1").is_err());
        assert!(column_index_from_ref("ZZZZZZZZ").is_err());
    }

    proptest! {
        #[test]
        fn column_codec_is_an_inverse(n in 1u32..=1000) {
            prop_assert_eq!(column_index_from_ref(&col_ref(n)).unwrap(), n);
        }
    }

    #[test]
    fn test_column_codec_exhaustive() {
        for n in 1..=MAX_COLS as u32 {
            assert_eq!(column_index_from_ref(&col_ref(n)).unwrap(), n);
        }
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("aa").unwrap(), 26);
        assert!(CellAddress::letters_to_column("A1").is_err());
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("B2").unwrap();
        assert_eq!(addr, CellAddress::new(1, 1));

        let addr = CellAddress::parse("XFD1048576").unwrap();
        assert_eq!(addr.row, 1_048_575);
        assert_eq!(addr.col, 16_383);

        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A1048577").is_err());
        assert!(CellAddress::parse("XFE1").is_err());
    }

    #[test]
    fn test_cell_address_display() {
        assert_eq!(CellAddress::new(0, 0).to_string(), "A1");
        assert_eq!(CellAddress::new(6, 2).to_string(), "C7");
        assert_eq!("AB12".parse::<CellAddress>().unwrap().to_string(), "AB12");
    }

    #[test]
    fn test_cell_range() {
        let range = CellRange::parse("D4:B2").unwrap();
        assert_eq!(range.start, CellAddress::new(1, 1));
        assert_eq!(range.end, CellAddress::new(3, 3));
        assert_eq!(range.row_count(), 3);
        assert_eq!(range.col_count(), 3);

        assert_eq!(CellRange::parse("A1").unwrap().to_string(), "A1:A1");
        assert!(CellRange::parse("A1:").is_err());
    }
}
