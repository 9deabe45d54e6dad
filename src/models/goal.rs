//! Savings goal model
//!
//! A goal accumulates contributions toward a target amount by a target date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::GoalId;
use super::money::Money;
use super::period::Month;

/// A savings goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,

    pub name: String,

    pub target_amount: Money,

    /// Amount saved so far; never negative
    #[serde(default)]
    pub current_amount: Money,

    pub target_date: NaiveDate,

    #[serde(default)]
    pub notes: String,

    /// Set the first time the goal reaches its target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(name: impl Into<String>, target_amount: Money, target_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: GoalId::new(),
            name: name.into(),
            target_amount,
            current_amount: Money::zero(),
            target_date,
            notes: String::new(),
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Progress toward the target, uncapped
    pub fn raw_progress_percent(&self) -> f64 {
        self.current_amount.percent_of(self.target_amount)
    }

    /// Progress toward the target, capped at 100
    pub fn progress_percent(&self) -> f64 {
        self.raw_progress_percent().min(100.0)
    }

    /// Amount still needed; zero once the target is reached
    pub fn remaining(&self) -> Money {
        let remaining = self.target_amount - self.current_amount;
        if remaining.is_negative() {
            Money::zero()
        } else {
            remaining
        }
    }

    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Days until the target date (negative when past)
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.target_date - today).num_days()
    }

    /// Amount to save per month to hit the target on time
    ///
    /// The remaining amount is spread over the calendar months from today's
    /// month through the target month, with a minimum of one month.
    pub fn monthly_required(&self, today: NaiveDate) -> Money {
        let months = Month::containing(today)
            .months_until(&Month::containing(self.target_date))
            .max(0)
            + 1;
        let remaining = self.remaining().minor();
        let per_month = (remaining + months - 1) / months;
        Money::from_minor(per_month)
    }

    /// Add savings to the goal
    ///
    /// Returns true when this contribution completed the goal.
    pub fn contribute(&mut self, amount: Money) -> bool {
        let was_completed = self.is_completed();
        self.current_amount += amount;
        self.updated_at = Utc::now();

        if !was_completed && self.is_completed() {
            if self.completed_at.is_none() {
                self.completed_at = Some(self.updated_at);
            }
            return true;
        }
        false
    }

    /// Take savings out of the goal
    pub fn withdraw(&mut self, amount: Money) -> Result<(), GoalValidationError> {
        if amount > self.current_amount {
            return Err(GoalValidationError::InsufficientSavings {
                available: self.current_amount,
                requested: amount,
            });
        }
        self.current_amount -= amount;
        if !self.is_completed() {
            self.completed_at = None;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.name.trim().is_empty() {
            return Err(GoalValidationError::EmptyName);
        }
        if !self.target_amount.is_positive() {
            return Err(GoalValidationError::NonPositiveTarget);
        }
        if self.current_amount.is_negative() {
            return Err(GoalValidationError::NegativeBalance);
        }
        Ok(())
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} / {})",
            self.name, self.current_amount, self.target_amount
        )
    }
}

/// Validation errors for goals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    EmptyName,
    NonPositiveTarget,
    NegativeBalance,
    InsufficientSavings { available: Money, requested: Money },
}

impl fmt::Display for GoalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Goal name is required"),
            Self::NonPositiveTarget => write!(f, "Goal target must be greater than zero"),
            Self::NegativeBalance => write!(f, "Goal savings cannot be negative"),
            Self::InsufficientSavings {
                available,
                requested,
            } => write!(
                f,
                "Cannot withdraw {}: only {} saved",
                requested, available
            ),
        }
    }
}

impl std::error::Error for GoalValidationError {}
