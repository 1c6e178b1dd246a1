use std::cmp::Ordering;
use std::fmt;

pub const COLUMN_COUNT: usize = 8;

pub const HEADERS: [&str; COLUMN_COUNT] = [
    "Track",
    "Artists",
    "Release",
    "#",
    "Length",
    "BPM",
    "Genres",
    "Release Date",
];

/// A table cell, kept as the value it was built from.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn empty() -> Self {
        Cell::Text(String::new())
    }

    /// Numbers sort before text; numbers numerically, text by code point.
    pub fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a.total_cmp(b),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            (Cell::Number(_), Cell::Text(_)) => Ordering::Less,
            (Cell::Text(_), Cell::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// One track as shown in the table: Track, Artists, Release, #, Length, BPM,
/// Genres, Release Date.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    cells: [Cell; COLUMN_COUNT],
}

impl DisplayRow {
    pub fn new(cells: [Cell; COLUMN_COUNT]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell; COLUMN_COUNT] {
        &self.cells
    }

    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(Cell::Number(128.0).to_string(), "128");
        assert_eq!(Cell::Number(127.5).to_string(), "127.5");
        assert_eq!(Cell::Text("x".to_owned()).to_string(), "x");
    }

    #[test]
    fn compare_orders_numbers_before_text() {
        let n = Cell::Number(300.0);
        let t = Cell::Text("unknown duration".to_owned());
        assert_eq!(n.compare(&t), Ordering::Less);
        assert_eq!(t.compare(&n), Ordering::Greater);
        assert_eq!(Cell::Number(9.0).compare(&Cell::Number(10.0)), Ordering::Less);
        assert_eq!(
            Cell::Text("B".to_owned()).compare(&Cell::Text("a".to_owned())),
            Ordering::Less
        );
    }
}
