pub mod output;
pub mod table;
pub mod theme;

pub use output::{diagnostic, error, info, section, success, summary_row, warn};
pub use table::{scope_table, ScopeRow};
pub use theme::{theme, Theme};
