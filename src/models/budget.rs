//! Budget model
//!
//! A per-category monthly spending cap, plus the computed status of a budget
//! against the month's expenses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::BudgetId;
use super::money::Money;
use super::period::Month;

/// A monthly spending cap for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    pub category: String,

    pub month: Month,

    /// Spending cap for the month
    pub amount: Money,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(category: impl Into<String>, month: Month, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            category: category.into(),
            month,
            amount,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_amount(&mut self, amount: Money) {
        self.amount = amount;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.category.trim().is_empty() {
            return Err(BudgetValidationError::EmptyCategory);
        }
        if !self.amount.is_positive() {
            return Err(BudgetValidationError::NonPositiveAmount);
        }
        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.month, self.category, self.amount)
    }
}

/// Where a budget stands for its month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetState {
    OnTrack,
    Warning,
    Exceeded,
}

impl fmt::Display for BudgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTrack => write!(f, "Aman"),
            Self::Warning => write!(f, "Hampir habis"),
            Self::Exceeded => write!(f, "Terlampaui"),
        }
    }
}

/// A budget together with the month's spending in its category
#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub spent: Money,
    /// Cap minus spent; negative when over budget
    pub remaining: Money,
    pub percent_used: f64,
    pub state: BudgetState,
}

impl BudgetStatus {
    /// Compute the status given the month's spending and the warning threshold
    pub fn compute(budget: Budget, spent: Money, warning_percent: u32) -> Self {
        let remaining = budget.amount - spent;
        let percent_used = spent.percent_of(budget.amount);

        let state = if spent >= budget.amount && !budget.amount.is_zero() {
            BudgetState::Exceeded
        } else if percent_used >= warning_percent as f64 {
            BudgetState::Warning
        } else {
            BudgetState::OnTrack
        };

        Self {
            budget,
            spent,
            remaining,
            percent_used,
            state,
        }
    }

    pub fn is_exceeded(&self) -> bool {
        self.state == BudgetState::Exceeded
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyCategory,
    NonPositiveAmount,
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCategory => write!(f, "Budget category is required"),
            Self::NonPositiveAmount => write!(f, "Budget amount must be greater than zero"),
        }
    }
}

impl std::error::Error for BudgetValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan() -> Month {
        Month::new(2025, 1).unwrap()
    }

    #[test]
    fn test_status_states() {
        let budget = Budget::new("Makanan & Minuman", jan(), Money::from_rupiah(1_000_000));

        let ok = BudgetStatus::compute(budget.clone(), Money::from_rupiah(500_000), 80);
        assert_eq!(ok.state, BudgetState::OnTrack);
        assert_eq!(ok.remaining, Money::from_rupiah(500_000));

        let warn = BudgetStatus::compute(budget.clone(), Money::from_rupiah(800_000), 80);
        assert_eq!(warn.state, BudgetState::Warning);

        let full = BudgetStatus::compute(budget.clone(), Money::from_rupiah(1_000_000), 80);
        assert_eq!(full.state, BudgetState::Exceeded);

        let over = BudgetStatus::compute(budget, Money::from_rupiah(1_200_000), 80);
        assert!(over.is_exceeded());
        assert_eq!(over.remaining, Money::from_rupiah(-200_000));
        assert!((over.percent_used - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate() {
        assert!(Budget::new("Hiburan", jan(), Money::from_rupiah(1)).validate().is_ok());
        assert_eq!(
            Budget::new("Hiburan", jan(), Money::zero()).validate(),
            Err(BudgetValidationError::NonPositiveAmount)
        );
        assert_eq!(
            Budget::new("", jan(), Money::from_rupiah(1)).validate(),
            Err(BudgetValidationError::EmptyCategory)
        );
    }
}
