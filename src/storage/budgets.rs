//! Budget repository backed by budgets.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::DompetError;
use crate::models::{same_category, Budget, BudgetId, Month};

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    budgets: Vec<Budget>,
}

/// Repository for monthly category budgets
pub struct BudgetRepository {
    path: PathBuf,
    data: RwLock<HashMap<BudgetId, Budget>>,
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), DompetError> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        data.clear();
        for budget in file_data.budgets {
            data.insert(budget.id, budget);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), DompetError> {
        let budgets = self.get_all()?;
        write_json_atomic(&self.path, &BudgetData { budgets })
    }

    pub fn get(&self, id: BudgetId) -> Result<Option<Budget>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// All budgets ordered by month, then category
    pub fn get_all(&self) -> Result<Vec<Budget>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        let mut budgets: Vec<_> = data.values().cloned().collect();
        budgets.sort_by(|a, b| {
            a.month
                .cmp(&b.month)
                .then_with(|| a.category.to_lowercase().cmp(&b.category.to_lowercase()))
        });
        Ok(budgets)
    }

    pub fn get_for_month(&self, month: Month) -> Result<Vec<Budget>, DompetError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|b| b.month == month)
            .collect())
    }

    /// The budget for a category in a month, category compared case-insensitively
    pub fn find(&self, category: &str, month: Month) -> Result<Option<Budget>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .values()
            .find(|b| b.month == month && same_category(&b.category, category))
            .cloned())
    }

    /// Find by full ID or short display form
    pub fn find_by_id(&self, identifier: &str) -> Result<Option<Budget>, DompetError> {
        if let Ok(id) = identifier.parse::<BudgetId>() {
            return self.get(id);
        }
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .values()
            .find(|b| b.id.matches_short(identifier))
            .cloned())
    }

    pub fn upsert(&self, budget: Budget) -> Result<(), DompetError> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(budget.id, budget);
        Ok(())
    }

    pub fn delete(&self, id: BudgetId) -> Result<Option<Budget>, DompetError> {
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
    use crate::models::Money;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, BudgetRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = BudgetRepository::new(temp_dir.path().join("budgets.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let (_temp, repo) = create_test_repo();
        let jan = Month::new(2025, 1).unwrap();
        repo.upsert(Budget::new("Hiburan", jan, Money::from_rupiah(500_000)))
            .unwrap();

        assert!(repo.find("hiburan", jan).unwrap().is_some());
        assert!(repo.find("HIBURAN ", jan).unwrap().is_some());
        assert!(repo.find("Hiburan", jan.next()).unwrap().is_none());
    }

    #[test]
    fn test_get_for_month_sorted() {
        let (_temp, repo) = create_test_repo();
        let jan = Month::new(2025, 1).unwrap();
        repo.upsert(Budget::new("Transportasi", jan, Money::from_rupiah(1)))
            .unwrap();
        repo.upsert(Budget::new("Belanja", jan, Money::from_rupiah(1)))
            .unwrap();
        repo.upsert(Budget::new("Belanja", jan.next(), Money::from_rupiah(1)))
            .unwrap();

        let names: Vec<_> = repo
            .get_for_month(jan)
            .unwrap()
            .into_iter()
            .map(|b| b.category)
            .collect();
        assert_eq!(names, vec!["Belanja", "Transportasi"]);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp, repo) = create_test_repo();
        let budget = Budget::new("Hiburan", Month::new(2025, 3).unwrap(), Money::from_rupiah(1));
        let id = budget.id;
        repo.upsert(budget).unwrap();
        repo.save().unwrap();

        let reloaded = BudgetRepository::new(temp.path().join("budgets.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
        assert_eq!(reloaded.find_by_id(&id.to_string()).unwrap().unwrap().id, id);
    }
}
