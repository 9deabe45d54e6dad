//! Notification repository backed by notifications.json
//!
//! Besides the notifications themselves, the file holds the set of
//! de-duplication markers. A marker records that an event (a budget exceeded
//! in a month, a bill due on a date, ...) has already been notified, and it
//! outlives the notification so deleting a notification does not bring it
//! back on the next check.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::DompetError;
use crate::models::{Month, Notification, NotificationId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct NotificationData {
    notifications: Vec<Notification>,
    #[serde(default)]
    markers: BTreeSet<String>,
}

/// The month a marker refers to, taken from its last `:`-separated segment
///
/// Markers without a date (e.g. `goal-reached:{id}`) return None.
pub fn marker_month(marker: &str) -> Option<Month> {
    let tail = marker.rsplit(':').next()?;
    if let Ok(date) = NaiveDate::parse_from_str(tail, "%Y-%m-%d") {
        return Some(Month::containing(date));
    }
    if tail.len() == 7 {
        return Month::parse(tail).ok();
    }
    None
}

/// Repository for notifications and their de-duplication markers
pub struct NotificationRepository {
    path: PathBuf,
    data: RwLock<HashMap<NotificationId, Notification>>,
    markers: RwLock<BTreeSet<String>>,
}

impl NotificationRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            markers: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn load(&self) -> Result<(), DompetError> {
        let file_data: NotificationData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        let mut markers = self.markers.write().map_err(lock_error)?;

        data.clear();
        for notification in file_data.notifications {
            data.insert(notification.id, notification);
        }
        *markers = file_data.markers;

        Ok(())
    }

    pub fn save(&self) -> Result<(), DompetError> {
        let notifications = self.get_all()?;
        let markers = self.markers.read().map_err(lock_error)?.clone();
        write_json_atomic(
            &self.path,
            &NotificationData {
                notifications,
                markers,
            },
        )
    }

    pub fn get(&self, id: NotificationId) -> Result<Option<Notification>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// All notifications, newest first
    pub fn get_all(&self) -> Result<Vec<Notification>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        let mut notifications: Vec<_> = data.values().cloned().collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    pub fn find(&self, identifier: &str) -> Result<Option<Notification>, DompetError> {
        if let Ok(id) = identifier.parse::<NotificationId>() {
            return self.get(id);
        }
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .values()
            .find(|n| n.id.matches_short(identifier))
            .cloned())
    }

    pub fn upsert(&self, notification: Notification) -> Result<(), DompetError> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(notification.id, notification);
        Ok(())
    }

    pub fn delete(&self, id: NotificationId) -> Result<Option<Notification>, DompetError> {
        let mut data = self.data.write().map_err(lock_error)?;
        Ok(data.remove(&id))
    }

    /// Remove every notification, keeping the markers
    pub fn clear(&self) -> Result<usize, DompetError> {
        let mut data = self.data.write().map_err(lock_error)?;
        let removed = data.len();
        data.clear();
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }

    pub fn has_marker(&self, marker: &str) -> Result<bool, DompetError> {
        let markers = self.markers.read().map_err(lock_error)?;
        Ok(markers.contains(marker))
    }

    /// Record a marker; returns false when it was already present
    pub fn add_marker(&self, marker: impl Into<String>) -> Result<bool, DompetError> {
        let mut markers = self.markers.write().map_err(lock_error)?;
        Ok(markers.insert(marker.into()))
    }

    /// Drop markers whose embedded month is earlier than `cutoff`
    ///
    /// Markers in `keep` stay regardless of age: they belong to events that
    /// are still active and would otherwise notify again.
    pub fn prune_markers(
        &self,
        cutoff: Month,
        keep: &BTreeSet<String>,
    ) -> Result<usize, DompetError> {
        let mut markers = self.markers.write().map_err(lock_error)?;
        let before = markers.len();
        markers.retain(|m| {
            keep.contains(m) || marker_month(m).map_or(true, |month| month >= cutoff)
        });
        Ok(before - markers.len())
    }

    pub fn marker_count(&self) -> Result<usize, DompetError> {
        let markers = self.markers.read().map_err(lock_error)?;
        Ok(markers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, NotificationRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = NotificationRepository::new(temp_dir.path().join("notifications.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_marker_month() {
        assert_eq!(
            marker_month("budget-exceeded:Makanan & Minuman:2025-01"),
            Month::new(2025, 1)
        );
        assert_eq!(
            marker_month("bill-due:bill-1a2b3c4d:2025-02-10"),
            Month::new(2025, 2)
        );
        assert_eq!(marker_month("goal-reached:goal-1a2b3c4d"), None);
    }

    #[test]
    fn test_markers_persist_and_survive_clear() {
        let (temp, repo) = create_test_repo();
        repo.upsert(Notification::new(
            NotificationKind::BudgetExceeded,
            "Anggaran terlampaui",
            "Hiburan",
            "budget-exceeded:Hiburan:2025-01",
        ))
        .unwrap();
        assert!(repo.add_marker("budget-exceeded:Hiburan:2025-01").unwrap());
        assert!(!repo.add_marker("budget-exceeded:Hiburan:2025-01").unwrap());

        assert_eq!(repo.clear().unwrap(), 1);
        repo.save().unwrap();

        let reloaded = NotificationRepository::new(temp.path().join("notifications.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 0);
        assert!(reloaded.has_marker("budget-exceeded:Hiburan:2025-01").unwrap());
    }

    #[test]
    fn test_prune_markers() {
        let (_temp, repo) = create_test_repo();
        repo.add_marker("budget-warning:Belanja:2023-05").unwrap();
        repo.add_marker("bill-overdue:bill-1:2024-12-01").unwrap();
        repo.add_marker("goal-reached:goal-1").unwrap();

        let removed = repo
            .prune_markers(Month::new(2024, 1).unwrap(), &BTreeSet::new())
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(repo.marker_count().unwrap(), 2);
        assert!(repo.has_marker("goal-reached:goal-1").unwrap());
    }

    #[test]
    fn test_prune_markers_keeps_active() {
        let (_temp, repo) = create_test_repo();
        repo.add_marker("bill-overdue:bill-1:2022-03-10").unwrap();
        repo.add_marker("bill-due:bill-2:2022-03-10").unwrap();

        let keep: BTreeSet<String> = ["bill-overdue:bill-1:2022-03-10".to_string()].into();
        let removed = repo.prune_markers(Month::new(2024, 1).unwrap(), &keep).unwrap();
        assert_eq!(removed, 1);
        assert!(repo.has_marker("bill-overdue:bill-1:2022-03-10").unwrap());
    }
}
