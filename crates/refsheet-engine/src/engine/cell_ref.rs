//! Cell address parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style addresses
//! (e.g., "A1", "B2", "AA100") and zero-indexed column/row coordinates.
//! Only uppercase column letters are accepted, and rows are 1-based in text.
//!
//! # Examples
//!
//! ```
//! use refsheet_engine::engine::CellRef;
//!
//! let cell = CellRef::parse("B3").unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::error::ErrorKind;

/// A reference to a cell by column and row indices (0-indexed).
///
/// Ordering is row-major, which is the order ranges are walked in.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

fn address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("cell address regex must compile")
    })
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse an address from spreadsheet notation (e.g., "A1", "B2", "AA10").
    pub fn parse(name: &str) -> Result<CellRef, ErrorKind> {
        Self::parse_a1(name).ok_or(ErrorKind::InvalidCellReference)
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = address_re().captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(col, row))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// Whether this address lies inside a grid of `rows` x `cols` cells.
    pub fn within(&self, rows: usize, cols: usize) -> bool {
        self.row < rows && self.col < cols
    }
}

impl std::str::FromStr for CellRef {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_letter_columns() {
        assert_eq!(CellRef::parse("A1"), Ok(CellRef::new(0, 0)));
        assert_eq!(CellRef::parse("B1"), Ok(CellRef::new(1, 0)));
        assert_eq!(CellRef::parse("Z1"), Ok(CellRef::new(25, 0)));
        assert_eq!(CellRef::parse("C12"), Ok(CellRef::new(2, 11)));
    }

    #[test]
    fn test_parse_multi_letter_columns() {
        assert_eq!(CellRef::parse("AA1").unwrap().col, 26);
        assert_eq!(CellRef::parse("AB1").unwrap().col, 27);
        assert_eq!(CellRef::parse("AZ1").unwrap().col, 51);
        assert_eq!(CellRef::parse("BA1").unwrap().col, 52);
        assert_eq!(CellRef::parse("AA12").unwrap().row, 11);
    }

    #[test]
    fn test_parse_invalid_inputs() {
        for bad in ["", "123", "ABC", "A0", "1A", "A 1", "a1", "A1B", "A1 ", "A-1"] {
            assert_eq!(
                CellRef::parse(bad),
                Err(ErrorKind::InvalidCellReference),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_overflow_is_invalid() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(CellRef::parse(&huge).is_err());
        assert!(CellRef::parse("A99999999999999999999999").is_err());
    }

    #[test]
    fn test_round_trip_through_display() {
        for col in 0..80 {
            for row in [0, 1, 9, 99] {
                let cell = CellRef::new(col, row);
                assert_eq!(cell.to_string().parse::<CellRef>(), Ok(cell));
            }
        }
    }

    #[test]
    fn test_col_to_letters() {
        assert_eq!(CellRef::col_to_letters(0), "A");
        assert_eq!(CellRef::col_to_letters(25), "Z");
        assert_eq!(CellRef::col_to_letters(26), "AA");
        assert_eq!(CellRef::col_to_letters(52), "BA");
        let letters = CellRef::col_to_letters(usize::MAX);
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut cells = vec![CellRef::new(1, 0), CellRef::new(0, 1), CellRef::new(0, 0)];
        cells.sort();
        assert_eq!(
            cells,
            vec![CellRef::new(0, 0), CellRef::new(1, 0), CellRef::new(0, 1)]
        );
    }
}
