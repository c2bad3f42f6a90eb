//! Terminal presentation: listing tables and stage progress bars.

mod progress;
mod tables;

pub use progress::StageBar;
pub use tables::{category_lines, print_banks, print_categories, print_sheets, truncate_string};
