use crate::domain::TrackTable;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const MAX_COLUMN_WIDTH: usize = 40;

const COLUMN_GAP: &str = "  ";

/// Renders the table with a header row and a rule, padding every column to
/// its widest cell in terminal cells. Wide cells are cut at `max_width`.
pub fn render_table(table: &TrackTable, max_width: usize) -> String {
    let columns = table.column_count();
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(table.row_count() + 1);
    grid.push(
        (0..columns)
            .map(|c| table.header(c).unwrap_or_default().to_owned())
            .collect(),
    );
    for row in table.rows() {
        grid.push(
            row.cells()
                .iter()
                .map(|cell| truncate(&cell.to_string(), max_width))
                .collect(),
        );
    }

    let widths: Vec<usize> = (0..columns)
        .map(|c| grid.iter().map(|r| r[c].width()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for (i, row) in grid.iter().enumerate() {
        push_line(&mut out, row, &widths);
        if i == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            push_line(&mut out, &rule, &widths);
        }
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, w)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        line.extend(std::iter::repeat_n(' ', w.saturating_sub(cell.width())));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_owned();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
