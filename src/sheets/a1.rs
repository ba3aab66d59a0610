//! A1-notation cell and range addressing

use std::fmt;

/// Column letters for a zero-based column index (0 -> "A", 26 -> "AA")
pub fn column_letters(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        // rem < 26, so the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// One cell: zero-based column, one-based row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
}

impl CellRef {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row)
    }
}

/// Inclusive rectangular range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeRef {
    pub start: CellRef,
    pub end: CellRef,
}

impl RangeRef {
    pub const fn new(start: CellRef, end: CellRef) -> Self {
        Self { start, end }
    }

    pub const fn cell(cell: CellRef) -> Self {
        Self {
            start: cell,
            end: cell,
        }
    }

    /// A single row spanning `width` columns from `start`
    pub const fn row_span(start: CellRef, width: u32) -> Self {
        Self {
            start,
            end: CellRef::new(start.column + width - 1, start.row),
        }
    }

    #[allow(dead_code)] // Used by the in-memory backend
    pub fn contains(&self, cell: CellRef) -> bool {
        (self.start.column..=self.end.column).contains(&cell.column)
            && (self.start.row..=self.end.row).contains(&cell.row)
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}
