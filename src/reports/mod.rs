//! Reports module for Dompet
//!
//! The monthly report (terminal and printable markdown) and spending
//! analysis over an arbitrary date range.

pub mod monthly;
pub mod spending;

pub use monthly::{DailyExpense, MonthlyReport};
pub use spending::SpendingReport;
