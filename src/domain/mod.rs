pub mod model;
pub mod table;

pub use model::{COLUMN_COUNT, Cell, DisplayRow, HEADERS};
pub use table::{SortOrder, TrackTable};
