//! Terminal prompts and plain-text output.

mod progress;
mod prompt;
mod table_view;

pub use progress::{describe_event, summary_line};
pub use prompt::{read_hidden, read_line};
pub use table_view::{MAX_COLUMN_WIDTH, render_table};
