//! Recurring bill model

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::category::BILLS_CATEGORY;
use super::ids::BillId;
use super::money::Money;
use super::period::add_months;

/// How often a bill repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillFrequency {
    Once,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BillFrequency {
    /// The due date following `due`, or None for one-off bills
    pub fn advance(&self, due: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Once => None,
            Self::Weekly => due.checked_add_days(Days::new(7)),
            Self::Monthly => Some(add_months(due, 1)),
            Self::Yearly => Some(add_months(due, 12)),
        }
    }
}

impl fmt::Display for BillFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Once => write!(f, "once"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for BillFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "once" | "one-time" | "sekali" => Ok(Self::Once),
            "weekly" | "mingguan" => Ok(Self::Weekly),
            "monthly" | "bulanan" => Ok(Self::Monthly),
            "yearly" | "annual" | "tahunan" => Ok(Self::Yearly),
            other => Err(format!(
                "Unknown frequency '{}'. Use once, weekly, monthly or yearly",
                other
            )),
        }
    }
}

/// Where a bill stands relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Paid,
    Overdue,
    DueSoon,
    Upcoming,
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paid => write!(f, "Lunas"),
            Self::Overdue => write!(f, "Terlambat"),
            Self::DueSoon => write!(f, "Segera"),
            Self::Upcoming => write!(f, "Mendatang"),
        }
    }
}

/// A recurring or one-off bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,

    pub name: String,

    pub amount: Money,

    #[serde(default = "default_category")]
    pub category: String,

    /// Next due date
    pub due_date: NaiveDate,

    #[serde(default)]
    pub frequency: BillFrequency,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_paid: Option<NaiveDate>,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_category() -> String {
    BILLS_CATEGORY.to_string()
}

fn default_active() -> bool {
    true
}

impl Bill {
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        due_date: NaiveDate,
        frequency: BillFrequency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BillId::new(),
            name: name.into(),
            amount,
            category: default_category(),
            due_date,
            frequency,
            active: true,
            last_paid: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Next due date once the current one is paid; None for one-off bills
    pub fn next_due_after_payment(&self) -> Option<NaiveDate> {
        self.frequency.advance(self.due_date)
    }

    /// Record a payment: advance the due date or deactivate a one-off bill
    pub fn mark_paid(&mut self, paid_on: NaiveDate) {
        self.last_paid = Some(paid_on);
        match self.next_due_after_payment() {
            Some(next) => self.due_date = next,
            None => self.active = false,
        }
        self.updated_at = Utc::now();
    }

    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    pub fn status(&self, today: NaiveDate, reminder_days: i64) -> BillStatus {
        if !self.active {
            return BillStatus::Paid;
        }
        let days = self.days_until_due(today);
        if days < 0 {
            BillStatus::Overdue
        } else if days <= reminder_days {
            BillStatus::DueSoon
        } else {
            BillStatus::Upcoming
        }
    }

    pub fn validate(&self) -> Result<(), BillValidationError> {
        if self.name.trim().is_empty() {
            return Err(BillValidationError::EmptyName);
        }
        if !self.amount.is_positive() {
            return Err(BillValidationError::NonPositiveAmount);
        }
        if self.category.trim().is_empty() {
            return Err(BillValidationError::EmptyCategory);
        }
        Ok(())
    }
}

impl fmt::Display for Bill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (due {})",
            self.name,
            self.amount,
            self.due_date.format("%Y-%m-%d")
        )
    }
}

/// Validation errors for bills
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillValidationError {
    EmptyName,
    NonPositiveAmount,
    EmptyCategory,
}

impl fmt::Display for BillValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Bill name is required"),
            Self::NonPositiveAmount => write!(f, "Bill amount must be greater than zero"),
            Self::EmptyCategory => write!(f, "Bill category is required"),
        }
    }
}

impl std::error::Error for BillValidationError {}
