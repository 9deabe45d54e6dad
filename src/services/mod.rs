//! Service layer for Dompet
//!
//! Business logic on top of the storage layer: validation, cross-entity
//! updates (goal savings, bill payments), computed views and auditing.

pub mod bill;
pub mod budget;
pub mod goal;
pub mod notification;
pub mod summary;
pub mod transaction;

pub use bill::{BillService, CreateBillInput, UpdateBillInput};
pub use budget::BudgetService;
pub use goal::{GoalService, UpdateGoalInput};
pub use notification::NotificationService;
pub use summary::{expense_by_category, CategoryTotal, MonthSummary, SummaryService};
pub use transaction::{
    CreateTransactionInput, TransactionFilter, TransactionService, UpdateTransactionInput,
};
