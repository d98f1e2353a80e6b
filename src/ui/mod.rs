//! Terminal output for the CLI

pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{header, info, is_quiet, quiet_from_env, set_quiet, success, summary_row, warn};
pub use table::{cursor_table, friends_table};
pub use theme::{theme, Theme};
