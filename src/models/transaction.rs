//! Transaction model
//!
//! A single income or expense record, optionally linked to a savings goal
//! (contributions) or a bill (payments).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::TransactionKind;
use super::ids::{BillId, GoalId, TransactionId};
use super::money::Money;

/// Maximum length of a transaction description
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Where a transaction was entered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    #[default]
    Manual,
    /// Created by the chat assistant through a tool call
    Chat,
    /// Created from a scanned receipt
    Receipt,
    /// Created from a free-text description
    Text,
}

impl fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Chat => write!(f, "chat"),
            Self::Receipt => write!(f, "receipt"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub kind: TransactionKind,

    /// Always positive; the direction comes from `kind`
    pub amount: Money,

    pub category: String,

    #[serde(default)]
    pub description: String,

    pub date: NaiveDate,

    /// Goal this transaction contributed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<GoalId>,

    /// Bill this transaction paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_id: Option<BillId>,

    #[serde(default)]
    pub source: TransactionSource,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            kind,
            amount,
            category: category.into(),
            description: String::new(),
            date,
            goal_id: None,
            bill_id: None,
            source: TransactionSource::Manual,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn expense(amount: Money, category: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(TransactionKind::Expense, amount, category, date)
    }

    pub fn income(amount: Money, category: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(TransactionKind::Income, amount, category, date)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Amount with sign applied: positive for income, negative for expense
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    /// Check whether the search text occurs in description or category
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.description.to_lowercase().contains(&needle)
            || self.category.to_lowercase().contains(&needle)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount);
        }

        if self.category.trim().is_empty() {
            return Err(TransactionValidationError::EmptyCategory);
        }

        let len = self.description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(TransactionValidationError::DescriptionTooLong(len));
        }

        if self.goal_id.is_some() && self.bill_id.is_some() {
            return Err(TransactionValidationError::GoalAndBill);
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.date.format("%Y-%m-%d"),
            self.category,
            if self.is_income() { "+" } else { "-" },
            self.amount
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount,
    EmptyCategory,
    DescriptionTooLong(usize),
    GoalAndBill,
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Amount must be greater than zero"),
            Self::EmptyCategory => write!(f, "Category is required"),
            Self::DescriptionTooLong(len) => write!(
                f,
                "Description too long ({} chars, max {})",
                len, MAX_DESCRIPTION_LEN
            ),
            Self::GoalAndBill => {
                write!(f, "A transaction cannot be linked to both a goal and a bill")
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_signed_amount() {
        let expense = Transaction::expense(Money::from_rupiah(50_000), "Transportasi", date());
        let income = Transaction::income(Money::from_rupiah(5_000_000), "Gaji", date());

        assert_eq!(expense.signed_amount(), Money::from_rupiah(-50_000));
        assert_eq!(income.signed_amount(), Money::from_rupiah(5_000_000));
        assert!(expense.is_expense());
        assert!(income.is_income());
    }

    #[test]
    fn test_validate() {
        let ok = Transaction::expense(Money::from_rupiah(1), "Belanja", date());
        assert!(ok.validate().is_ok());

        let zero = Transaction::expense(Money::zero(), "Belanja", date());
        assert_eq!(
            zero.validate(),
            Err(TransactionValidationError::NonPositiveAmount)
        );

        let blank = Transaction::expense(Money::from_rupiah(1), "  ", date());
        assert_eq!(blank.validate(), Err(TransactionValidationError::EmptyCategory));

        let long = Transaction::expense(Money::from_rupiah(1), "Belanja", date())
            .with_description("x".repeat(MAX_DESCRIPTION_LEN + 1));
        assert!(matches!(
            long.validate(),
            Err(TransactionValidationError::DescriptionTooLong(_))
        ));

        let mut both = Transaction::expense(Money::from_rupiah(1), "Tabungan", date());
        both.goal_id = Some(GoalId::new());
        both.bill_id = Some(BillId::new());
        assert_eq!(both.validate(), Err(TransactionValidationError::GoalAndBill));
    }

    #[test]
    fn test_matches_search() {
        let txn = Transaction::expense(Money::from_rupiah(25_000), "Makanan & Minuman", date())
            .with_description("Nasi goreng");
        assert!(txn.matches_search("GORENG"));
        assert!(txn.matches_search("makanan"));
        assert!(!txn.matches_search("bensin"));
    }

    #[test]
    fn test_display() {
        let txn = Transaction::expense(Money::from_rupiah(50_000), "Transportasi", date());
        assert_eq!(format!("{}", txn), "2025-01-15 Transportasi - Rp50.000");
    }

    #[test]
    fn test_serialization_skips_empty_links() {
        let txn = Transaction::income(Money::from_rupiah(10), "Bonus", date());
        let json = serde_json::to_string(&txn).unwrap();
        assert!(!json.contains("goal_id"));
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, txn.id);
        assert_eq!(back.kind, TransactionKind::Income);
    }
}
