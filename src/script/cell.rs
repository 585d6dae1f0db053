//! A1-style cell, range, and column references

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Largest zero-based column index (XFD)
pub const MAX_COL: u16 = 16_383;

/// Largest zero-based row index (1048576 in A1 terms)
pub const MAX_ROW: u32 = 1_048_575;

static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{1,3})([1-9][0-9]{0,6})$").expect("valid cell regex"));

static COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]{1,3}$").expect("valid column regex"));

/// Zero-based cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse `B7` style references
    pub fn parse(text: &str) -> Result<Self, String> {
        let caps = CELL_RE
            .captures(text)
            .ok_or_else(|| format!("'{}' is not a cell reference like B7", text))?;

        let col = parse_column(&caps[1])?;
        let row: u32 = caps[2]
            .parse()
            .map_err(|_| format!("row number in '{}' is out of range", text))?;
        if row == 0 || row - 1 > MAX_ROW {
            return Err(format!("row number in '{}' is out of range", text));
        }

        Ok(Self { row: row - 1, col })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row + 1)
    }
}

/// Rectangular range, always stored top-left to bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRef {
    pub first: CellRef,
    pub last: CellRef,
}

impl RangeRef {
    /// Parse `A1:D1` style ranges; the corners may be given in any order
    pub fn parse(text: &str) -> Result<Self, String> {
        let (a, b) = text
            .split_once(':')
            .ok_or_else(|| format!("'{}' is not a range like A1:D1", text))?;
        let a = CellRef::parse(a)?;
        let b = CellRef::parse(b)?;

        Ok(Self {
            first: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            last: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        })
    }

    pub fn is_single_cell(&self) -> bool {
        self.first == self.last
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}

/// Parse column letters (`A`, `AB`, `XFD`) into a zero-based index
pub fn parse_column(letters: &str) -> Result<u16, String> {
    if !COLUMN_RE.is_match(letters) {
        return Err(format!("'{}' is not a column like C", letters));
    }

    let mut n: u32 = 0;
    for ch in letters.chars() {
        n = n * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    let index = n - 1;
    if index > MAX_COL as u32 {
        return Err(format!("column '{}' is beyond XFD", letters));
    }
    Ok(index as u16)
}

/// Convert a zero-based column index back to letters
pub fn column_name(col: u16) -> String {
    let mut name = String::new();
    let mut n = col as u32 + 1;

    while n > 0 {
        n -= 1;
        name.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }

    name
}
