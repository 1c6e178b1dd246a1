use super::model::{COLUMN_COUNT, Cell, DisplayRow, HEADERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// The track list as a table of fixed width.
#[derive(Debug, Clone, Default)]
pub struct TrackTable {
    rows: Vec<DisplayRow>,
}

impl TrackTable {
    pub fn new(rows: Vec<DisplayRow>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        COLUMN_COUNT
    }

    pub fn header(&self, column: usize) -> Option<&'static str> {
        HEADERS.get(column).copied()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cell(column))
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    /// Stable sort by `column`. Descending order is the ascending order
    /// reversed. Out-of-range columns leave the rows untouched.
    pub fn sort(&mut self, column: usize, order: SortOrder) {
        if column >= COLUMN_COUNT {
            tracing::warn!(column, "sort column out of range");
            return;
        }
        self.rows
            .sort_by(|a, b| a.cells()[column].compare(&b.cells()[column]));
        if order == SortOrder::Descending {
            self.rows.reverse();
        }
    }
}
