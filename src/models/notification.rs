//! In-app notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::NotificationId;

/// What triggered a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BudgetWarning,
    BudgetExceeded,
    BillDueSoon,
    BillOverdue,
    GoalReached,
    GoalDeadline,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::BudgetWarning => "!",
            Self::BudgetExceeded => "!!",
            Self::BillDueSoon => "~",
            Self::BillOverdue => "!!",
            Self::GoalReached => "*",
            Self::GoalDeadline => "~",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetWarning => write!(f, "budget_warning"),
            Self::BudgetExceeded => write!(f, "budget_exceeded"),
            Self::BillDueSoon => write!(f, "bill_due_soon"),
            Self::BillOverdue => write!(f, "bill_overdue"),
            Self::GoalReached => write!(f, "goal_reached"),
            Self::GoalDeadline => write!(f, "goal_deadline"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Marker that prevents the same event from notifying twice
    pub dedup_key: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        dedup_key: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            kind,
            title: title.into(),
            message: message.into(),
            dedup_key: dedup_key.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.icon(), self.title, self.message)
    }
}
