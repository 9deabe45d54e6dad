//! Core data models for Dompet
//!
//! This module contains the data structures of the personal-finance domain:
//! transactions, budgets, savings goals, bills and notifications.

pub mod bill;
pub mod budget;
pub mod category;
pub mod goal;
pub mod ids;
pub mod money;
pub mod notification;
pub mod period;
pub mod transaction;

pub use bill::{Bill, BillFrequency, BillStatus};
pub use budget::{Budget, BudgetState, BudgetStatus};
pub use category::{
    normalize_category, same_category, TransactionKind, BILLS_CATEGORY, EXPENSE_CATEGORIES,
    INCOME_CATEGORIES, SAVINGS_CATEGORY,
};
pub use goal::Goal;
pub use ids::{BillId, BudgetId, GoalId, NotificationId, TransactionId};
pub use money::Money;
pub use notification::{Notification, NotificationKind};
pub use period::{add_months, Month};
pub use transaction::{Transaction, TransactionSource};
