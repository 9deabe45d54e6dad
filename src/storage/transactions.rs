//! Transaction repository backed by transactions.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::DompetError;
use crate::models::{BillId, GoalId, Month, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Newest first; ties broken by creation time
fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

/// Repository for transaction persistence
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk, replacing anything in memory
    pub fn load(&self) -> Result<(), DompetError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        data.clear();
        for txn in file_data.transactions {
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), DompetError> {
        let transactions = self.get_all()?;
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// All transactions, newest first
    pub fn get_all(&self) -> Result<Vec<Transaction>, DompetError> {
        self.filtered(|_| true)
    }

    /// Transactions dated within `start..=end`, newest first
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>, DompetError> {
        self.filtered(|t| t.date >= start && t.date <= end)
    }

    pub fn get_by_month(&self, month: Month) -> Result<Vec<Transaction>, DompetError> {
        self.get_by_date_range(month.start_date(), month.end_date())
    }

    pub fn get_by_goal(&self, goal_id: GoalId) -> Result<Vec<Transaction>, DompetError> {
        self.filtered(|t| t.goal_id == Some(goal_id))
    }

    pub fn get_by_bill(&self, bill_id: BillId) -> Result<Vec<Transaction>, DompetError> {
        self.filtered(|t| t.bill_id == Some(bill_id))
    }

    /// Find a transaction by full ID or short display form
    pub fn find(&self, identifier: &str) -> Result<Option<Transaction>, DompetError> {
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return self.get(id);
        }

        let data = self.data.read().map_err(lock_error)?;
        let mut matches = data.values().filter(|t| t.id.matches_short(identifier));
        match (matches.next(), matches.next()) {
            (Some(txn), None) => Ok(Some(txn.clone())),
            (Some(_), Some(_)) => Err(DompetError::Validation(format!(
                "Transaction ID '{}' is ambiguous; use more characters",
                identifier
            ))),
            _ => Ok(None),
        }
    }

    pub fn upsert(&self, txn: Transaction) -> Result<(), DompetError> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(txn.id, txn);
        Ok(())
    }

    /// Remove a transaction, returning it if it existed
    pub fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, DompetError> {
        let mut data = self.data.write().map_err(lock_error)?;
        Ok(data.remove(&id))
    }

    pub fn count(&self) -> Result<usize, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }

    fn filtered<F>(&self, keep: F) -> Result<Vec<Transaction>, DompetError>
    where
        F: Fn(&Transaction) -> bool,
    {
        let data = self.data.read().map_err(lock_error)?;
        let mut transactions: Vec<_> = data.values().filter(|t| keep(t)).cloned().collect();
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        (temp_dir, repo)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let txn = Transaction::expense(Money::from_rupiah(50_000), "Transportasi", date(15));
        let id = txn.id;

        repo.upsert(txn).unwrap();
        repo.save().unwrap();

        let reloaded = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
        assert_eq!(
            reloaded.get(id).unwrap().unwrap().amount,
            Money::from_rupiah(50_000)
        );
    }

    #[test]
    fn test_sorted_newest_first_and_date_range() {
        let (_temp_dir, repo) = create_test_repo();
        for d in [10, 20, 15] {
            repo.upsert(Transaction::expense(Money::from_rupiah(d as i64), "Belanja", date(d)))
                .unwrap();
        }

        let all = repo.get_all().unwrap();
        let days: Vec<_> = all.iter().map(|t| t.date).collect();
        assert_eq!(days, vec![date(20), date(15), date(10)]);

        let range = repo.get_by_date_range(date(12), date(18)).unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range[0].date, date(15));

        let january = repo.get_by_month(Month::new(2025, 1).unwrap()).unwrap();
        assert_eq!(january.len(), 3);
        assert!(repo
            .get_by_month(Month::new(2025, 2).unwrap())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_links() {
        let (_temp_dir, repo) = create_test_repo();
        let goal_id = GoalId::new();
        let bill_id = BillId::new();

        let mut saving = Transaction::expense(Money::from_rupiah(100_000), "Tabungan", date(1));
        saving.goal_id = Some(goal_id);
        let mut payment = Transaction::expense(Money::from_rupiah(300_000), "Tagihan", date(2));
        payment.bill_id = Some(bill_id);

        repo.upsert(saving).unwrap();
        repo.upsert(payment).unwrap();

        assert_eq!(repo.get_by_goal(goal_id).unwrap().len(), 1);
        assert_eq!(repo.get_by_bill(bill_id).unwrap().len(), 1);
        assert!(repo.get_by_goal(GoalId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_find_by_short_id_and_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = Transaction::income(Money::from_rupiah(1), "Gaji", date(1));
        let id = txn.id;
        repo.upsert(txn).unwrap();

        let short = id.to_string();
        assert_eq!(repo.find(&short).unwrap().unwrap().id, id);
        assert_eq!(repo.find(&id.as_uuid().to_string()).unwrap().unwrap().id, id);
        assert!(repo.find("txn-zzzzzzzz").unwrap().is_none());

        assert!(repo.delete(id).unwrap().is_some());
        assert!(repo.delete(id).unwrap().is_none());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
