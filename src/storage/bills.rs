//! Bill repository backed by bills.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::DompetError;
use crate::models::{Bill, BillId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BillData {
    bills: Vec<Bill>,
}

/// Repository for recurring bills
pub struct BillRepository {
    path: PathBuf,
    data: RwLock<HashMap<BillId, Bill>>,
}

impl BillRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), DompetError> {
        let file_data: BillData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        data.clear();
        for bill in file_data.bills {
            data.insert(bill.id, bill);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), DompetError> {
        let bills = self.get_all()?;
        write_json_atomic(&self.path, &BillData { bills })
    }

    pub fn get(&self, id: BillId) -> Result<Option<Bill>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// All bills ordered by due date
    pub fn get_all(&self) -> Result<Vec<Bill>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        let mut bills: Vec<_> = data.values().cloned().collect();
        bills.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
        Ok(bills)
    }

    pub fn get_active(&self) -> Result<Vec<Bill>, DompetError> {
        Ok(self.get_all()?.into_iter().filter(|b| b.active).collect())
    }

    /// Find a bill by name, ignoring case
    pub fn find_by_name(&self, name: &str) -> Result<Option<Bill>, DompetError> {
        let needle = name.trim().to_lowercase();
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .values()
            .find(|b| b.name.trim().to_lowercase() == needle)
            .cloned())
    }

    pub fn find_by_short_id(&self, identifier: &str) -> Result<Option<Bill>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .values()
            .find(|b| b.id.matches_short(identifier))
            .cloned())
    }

    pub fn upsert(&self, bill: Bill) -> Result<(), DompetError> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(bill.id, bill);
        Ok(())
    }

    pub fn delete(&self, id: BillId) -> Result<Option<Bill>, DompetError> {
        let mut data = self.data.write().map_err(lock_error)?;
        Ok(data.remove(&id))
    }

    pub fn count(&self) -> Result<usize, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillFrequency, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_active_and_find() {
        let temp = TempDir::new().unwrap();
        let repo = BillRepository::new(temp.path().join("bills.json"));
        let due = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();

        let listrik = Bill::new("Listrik", Money::from_rupiah(350_000), due, BillFrequency::Monthly);
        let mut servis = Bill::new("Servis AC", Money::from_rupiah(200_000), due, BillFrequency::Once);
        servis.active = false;

        repo.upsert(listrik).unwrap();
        repo.upsert(servis).unwrap();

        assert_eq!(repo.get_all().unwrap().len(), 2);
        let active = repo.get_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Listrik");

        assert!(repo.find_by_name("listrik").unwrap().is_some());
        assert!(repo.find_by_name("air").unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let repo = BillRepository::new(temp.path().join("bills.json"));
        let bill = Bill::new(
            "Internet",
            Money::from_rupiah(300_000),
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            BillFrequency::Monthly,
        );
        let id = bill.id;
        repo.upsert(bill).unwrap();
        repo.save().unwrap();

        let reloaded = BillRepository::new(temp.path().join("bills.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get(id).unwrap().unwrap().name, "Internet");
        assert_eq!(reloaded.find_by_short_id(&id.to_string()).unwrap().unwrap().id, id);
    }
}
