//! Notification service
//!
//! Evaluates the budget, bill and goal rules and turns newly detected events
//! into notifications. Every event has a de-duplication marker; an event whose
//! marker is already stored never notifies again, even after the user deleted
//! the notification.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::config::settings::NotificationSettings;
use crate::error::{DompetError, DompetResult};
use crate::models::{
    add_months, BillStatus, BudgetState, Month, Notification, NotificationId, NotificationKind,
};
use crate::storage::Storage;

use super::budget::BudgetService;

/// Markers older than this many months are forgotten
const MARKER_RETENTION_MONTHS: i32 = 13;

/// Service for in-app notifications
pub struct NotificationService<'a> {
    storage: &'a Storage,
    settings: NotificationSettings,
}

/// An event detected by the rules, before de-duplication
struct Candidate {
    kind: NotificationKind,
    marker: String,
    title: String,
    message: String,
}

impl<'a> NotificationService<'a> {
    pub fn new(storage: &'a Storage, settings: &NotificationSettings) -> Self {
        Self {
            storage,
            settings: settings.clone(),
        }
    }

    /// Run every rule for `today` and store notifications for new events
    ///
    /// Returns the notifications created by this run.
    pub fn generate(&self, today: NaiveDate) -> DompetResult<Vec<Notification>> {
        let mut candidates = self.budget_candidates(today)?;
        candidates.extend(self.bill_candidates(today)?);
        candidates.extend(self.goal_candidates(today)?);

        let active: BTreeSet<String> = candidates.iter().map(|c| c.marker.clone()).collect();
        let cutoff = Month::containing(add_months(today, -MARKER_RETENTION_MONTHS));
        let pruned = self.storage.notifications.prune_markers(cutoff, &active)?;
        if pruned > 0 {
            debug!(pruned, "pruned old notification markers");
        }

        let mut created = Vec::new();
        for candidate in candidates {
            if !self.storage.notifications.add_marker(candidate.marker.clone())? {
                continue;
            }
            let notification = Notification::new(
                candidate.kind,
                candidate.title,
                candidate.message,
                candidate.marker,
            );
            self.storage.notifications.upsert(notification.clone())?;
            self.storage.log_create(
                EntityType::Notification,
                notification.id.to_string(),
                Some(notification.title.clone()),
                &notification,
            )?;
            created.push(notification);
        }

        self.storage.notifications.save()?;
        if !created.is_empty() {
            info!(count = created.len(), "new notifications");
        }
        Ok(created)
    }

    fn budget_candidates(&self, today: NaiveDate) -> DompetResult<Vec<Candidate>> {
        let month = Month::containing(today);
        let statuses =
            BudgetService::new(self.storage, self.settings.budget_warning_percent).status(month)?;

        Ok(statuses
            .into_iter()
            .filter_map(|status| {
                let category = &status.budget.category;
                match status.state {
                    BudgetState::Exceeded => Some(Candidate {
                        kind: NotificationKind::BudgetExceeded,
                        marker: format!("budget-exceeded:{}:{}", category, month),
                        title: format!("Anggaran {} terlampaui", category),
                        message: format!(
                            "Pengeluaran {} bulan {} sudah {} dari anggaran {} ({:.0}%)",
                            category,
                            month.display_name(),
                            status.spent,
                            status.budget.amount,
                            status.percent_used
                        ),
                    }),
                    BudgetState::Warning => Some(Candidate {
                        kind: NotificationKind::BudgetWarning,
                        marker: format!("budget-warning:{}:{}", category, month),
                        title: format!("Anggaran {} hampir habis", category),
                        message: format!(
                            "Sudah terpakai {:.0}% dari anggaran {}; sisa {}",
                            status.percent_used, status.budget.amount, status.remaining
                        ),
                    }),
                    BudgetState::OnTrack => None,
                }
            })
            .collect())
    }

    fn bill_candidates(&self, today: NaiveDate) -> DompetResult<Vec<Candidate>> {
        let reminder_days = self.settings.bill_reminder_days;
        Ok(self
            .storage
            .bills
            .get_active()?
            .into_iter()
            .filter_map(|bill| match bill.status(today, reminder_days) {
                BillStatus::Overdue => Some(Candidate {
                    kind: NotificationKind::BillOverdue,
                    marker: format!("bill-overdue:{}:{}", bill.id, bill.due_date),
                    title: format!("Tagihan {} terlambat", bill.name),
                    message: format!(
                        "{} sebesar {} jatuh tempo {} dan belum dibayar",
                        bill.name, bill.amount, bill.due_date
                    ),
                }),
                BillStatus::DueSoon => {
                    let days = bill.days_until_due(today);
                    let when = if days == 0 {
                        "hari ini".to_string()
                    } else {
                        format!("dalam {} hari", days)
                    };
                    Some(Candidate {
                        kind: NotificationKind::BillDueSoon,
                        marker: format!("bill-due:{}:{}", bill.id, bill.due_date),
                        title: format!("Tagihan {} segera jatuh tempo", bill.name),
                        message: format!(
                            "{} sebesar {} jatuh tempo {} ({})",
                            bill.name, bill.amount, when, bill.due_date
                        ),
                    })
                }
                BillStatus::Upcoming | BillStatus::Paid => None,
            })
            .collect())
    }

    fn goal_candidates(&self, today: NaiveDate) -> DompetResult<Vec<Candidate>> {
        let deadline_days = self.settings.goal_deadline_days;
        let mut candidates = Vec::new();

        for goal in self.storage.goals.get_all()? {
            if goal.is_completed() {
                candidates.push(Candidate {
                    kind: NotificationKind::GoalReached,
                    marker: format!("goal-reached:{}", goal.id),
                    title: format!("Target {} tercapai", goal.name),
                    message: format!(
                        "Selamat! Tabungan {} sudah mencapai {}",
                        goal.name, goal.target_amount
                    ),
                });
                continue;
            }

            let days_left = goal.days_left(today);
            if (0..=deadline_days).contains(&days_left) {
                candidates.push(Candidate {
                    kind: NotificationKind::GoalDeadline,
                    marker: format!("goal-deadline:{}:{}", goal.id, goal.target_date),
                    title: format!("Target {} tinggal {} hari", goal.name, days_left),
                    message: format!(
                        "Masih kurang {} ({:.0}% tercapai) sebelum {}",
                        goal.remaining(),
                        goal.progress_percent(),
                        goal.target_date
                    ),
                });
            }
        }

        Ok(candidates)
    }

    pub fn list(&self, unread_only: bool) -> DompetResult<Vec<Notification>> {
        Ok(self
            .storage
            .notifications
            .get_all()?
            .into_iter()
            .filter(|n| !unread_only || !n.read)
            .collect())
    }

    pub fn find(&self, identifier: &str) -> DompetResult<Notification> {
        self.storage
            .notifications
            .find(identifier)?
            .ok_or_else(|| DompetError::notification_not_found(identifier))
    }

    pub fn mark_read(&self, id: NotificationId) -> DompetResult<Notification> {
        let mut notification = self
            .storage
            .notifications
            .get(id)?
            .ok_or_else(|| DompetError::notification_not_found(id.to_string()))?;

        if !notification.read {
            notification.read = true;
            self.storage.notifications.upsert(notification.clone())?;
            self.storage.notifications.save()?;
        }
        Ok(notification)
    }

    /// Mark every notification read; returns how many changed
    pub fn mark_all_read(&self) -> DompetResult<usize> {
        let mut changed = 0;
        for mut notification in self.storage.notifications.get_all()? {
            if !notification.read {
                notification.read = true;
                self.storage.notifications.upsert(notification)?;
                changed += 1;
            }
        }
        if changed > 0 {
            self.storage.notifications.save()?;
        }
        Ok(changed)
    }

    pub fn delete(&self, id: NotificationId) -> DompetResult<Notification> {
        let notification = self
            .storage
            .notifications
            .delete(id)?
            .ok_or_else(|| DompetError::notification_not_found(id.to_string()))?;
        self.storage.notifications.save()?;
        self.storage.log_delete(
            EntityType::Notification,
            notification.id.to_string(),
            Some(notification.title.clone()),
            &notification,
        )?;
        Ok(notification)
    }

    /// Remove all notifications; markers are kept
    pub fn clear(&self) -> DompetResult<usize> {
        let removed = self.storage.notifications.clear()?;
        self.storage.notifications.save()?;
        Ok(removed)
    }

    pub fn unread_count(&self) -> DompetResult<usize> {
        Ok(self.list(true)?.len())
    }
}
