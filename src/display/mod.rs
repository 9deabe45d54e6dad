//! Display formatting for terminal output
//!
//! List views are rendered as tables with `tabled`; detail views are plain
//! aligned `key: value` lines.

pub mod bill;
pub mod budget;
pub mod goal;
pub mod notification;
pub mod summary;
pub mod transaction;

pub use bill::{format_bill_details, format_bill_table};
pub use budget::format_budget_table;
pub use goal::{format_goal_details, format_goal_table};
pub use notification::format_notification_list;
pub use summary::format_month_summary;
pub use transaction::{format_transaction_details, format_transaction_table};

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

/// Render rows as a table, right-aligning the given columns
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>, right_aligned: &[usize]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    for &column in right_aligned {
        table.with(Modify::new(Columns::single(column)).with(Alignment::right()));
    }
    table.to_string()
}

/// Shorten a string to at most `max_chars` characters
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Text progress bar, e.g. `[#####-----]`
pub(crate) fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled.min(width)))
}
