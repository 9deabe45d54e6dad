//! Savings goal service

use chrono::NaiveDate;
use tracing::info;

use crate::audit::EntityType;
use crate::error::{DompetError, DompetResult};
use crate::models::{
    Goal, GoalId, Money, Transaction, TransactionKind, TransactionSource, SAVINGS_CATEGORY,
};
use crate::storage::Storage;

use super::transaction::{CreateTransactionInput, TransactionService};

/// Service for savings goals
pub struct GoalService<'a> {
    storage: &'a Storage,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateGoalInput {
    pub name: Option<String>,
    pub target_amount: Option<Money>,
    pub target_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl<'a> GoalService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a goal
    ///
    /// An initial amount is recorded as a first contribution so the savings
    /// always match the goal-linked transactions.
    pub fn create(
        &self,
        name: &str,
        target_amount: Money,
        target_date: NaiveDate,
        initial_amount: Option<Money>,
        today: NaiveDate,
    ) -> DompetResult<Goal> {
        let name = name.trim();
        if self.storage.goals.find_by_name(name)?.is_some() {
            return Err(DompetError::Duplicate {
                entity_type: "Goal",
                identifier: name.to_string(),
            });
        }
        if target_date < today {
            return Err(DompetError::Validation(format!(
                "Target date {} is in the past",
                target_date
            )));
        }

        let goal = Goal::new(name, target_amount, target_date);
        goal.validate()
            .map_err(|e| DompetError::Validation(e.to_string()))?;

        self.storage.goals.upsert(goal.clone())?;
        self.storage.goals.save()?;
        self.storage.log_create(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &goal,
        )?;
        info!(goal = %goal.name, target = %goal.target_amount, "goal created");

        match initial_amount {
            Some(amount) if amount.is_positive() => {
                let (_, goal) = self.contribute(goal.id, amount, today, TransactionSource::Manual)?;
                Ok(goal)
            }
            _ => Ok(goal),
        }
    }

    pub fn get(&self, id: GoalId) -> DompetResult<Option<Goal>> {
        self.storage.goals.get(id)
    }

    /// Find by name (case-insensitive) or ID
    pub fn find(&self, identifier: &str) -> DompetResult<Option<Goal>> {
        if let Some(goal) = self.storage.goals.find_by_name(identifier)? {
            return Ok(Some(goal));
        }
        if let Ok(id) = identifier.parse::<GoalId>() {
            return self.storage.goals.get(id);
        }
        self.storage.goals.find_by_short_id(identifier)
    }

    /// Like `find`, but a missing goal is an error
    pub fn resolve(&self, identifier: &str) -> DompetResult<Goal> {
        self.find(identifier)?
            .ok_or_else(|| DompetError::goal_not_found(identifier))
    }

    pub fn list(&self, include_completed: bool) -> DompetResult<Vec<Goal>> {
        Ok(self
            .storage
            .goals
            .get_all()?
            .into_iter()
            .filter(|g| include_completed || !g.is_completed())
            .collect())
    }

    pub fn update(&self, id: GoalId, input: UpdateGoalInput) -> DompetResult<Goal> {
        let before = self
            .storage
            .goals
            .get(id)?
            .ok_or_else(|| DompetError::goal_not_found(id.to_string()))?;

        let mut goal = before.clone();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if let Some(existing) = self.storage.goals.find_by_name(&name)? {
                if existing.id != id {
                    return Err(DompetError::Duplicate {
                        entity_type: "Goal",
                        identifier: name,
                    });
                }
            }
            goal.name = name;
        }
        if let Some(target) = input.target_amount {
            goal.target_amount = target;
        }
        if let Some(date) = input.target_date {
            goal.target_date = date;
        }
        if let Some(notes) = input.notes {
            goal.notes = notes;
        }

        goal.completed_at = match (goal.is_completed(), goal.completed_at) {
            (true, None) => Some(chrono::Utc::now()),
            (true, at) => at,
            (false, _) => None,
        };
        goal.updated_at = chrono::Utc::now();

        goal.validate()
            .map_err(|e| DompetError::Validation(e.to_string()))?;

        self.storage.goals.upsert(goal.clone())?;
        self.storage.goals.save()?;
        self.storage.log_update(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &before,
            &goal,
            None,
        )?;

        Ok(goal)
    }

    /// Delete a goal; its transactions stay but lose the link
    pub fn delete(&self, id: GoalId) -> DompetResult<Goal> {
        let goal = self
            .storage
            .goals
            .get(id)?
            .ok_or_else(|| DompetError::goal_not_found(id.to_string()))?;

        let linked = self.storage.transactions.get_by_goal(id)?;
        for before in &linked {
            let mut txn = before.clone();
            txn.goal_id = None;
            txn.touch();
            self.storage.transactions.upsert(txn.clone())?;
            self.storage.log_update(
                EntityType::Transaction,
                txn.id.to_string(),
                Some(txn.to_string()),
                before,
                &txn,
                Some(format!("goal_id: {} -> (removed)", id)),
            )?;
        }
        if !linked.is_empty() {
            self.storage.transactions.save()?;
        }

        self.storage.goals.delete(id)?;
        self.storage.goals.save()?;
        self.storage.log_delete(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &goal,
        )?;

        Ok(goal)
    }

    /// Save money toward a goal
    ///
    /// Records a goal-linked expense in the savings category, which credits
    /// the goal.
    pub fn contribute(
        &self,
        id: GoalId,
        amount: Money,
        date: NaiveDate,
        source: TransactionSource,
    ) -> DompetResult<(Transaction, Goal)> {
        self.record(id, TransactionKind::Expense, amount, date, source)
    }

    /// Take money out of a goal
    ///
    /// Records a goal-linked income in the savings category, which debits the
    /// goal. Withdrawing more than is saved is a validation error.
    pub fn withdraw(
        &self,
        id: GoalId,
        amount: Money,
        date: NaiveDate,
        source: TransactionSource,
    ) -> DompetResult<(Transaction, Goal)> {
        self.record(id, TransactionKind::Income, amount, date, source)
    }

    fn record(
        &self,
        id: GoalId,
        kind: TransactionKind,
        amount: Money,
        date: NaiveDate,
        source: TransactionSource,
    ) -> DompetResult<(Transaction, Goal)> {
        let goal = self
            .storage
            .goals
            .get(id)?
            .ok_or_else(|| DompetError::goal_not_found(id.to_string()))?;

        let description = match kind {
            TransactionKind::Expense => format!("Tabungan: {}", goal.name),
            TransactionKind::Income => format!("Penarikan tabungan: {}", goal.name),
        };

        let mut input = CreateTransactionInput::new(kind, amount, SAVINGS_CATEGORY, date)
            .description(description)
            .source(source);
        input.goal_id = Some(id);

        let txn = TransactionService::new(self.storage).create(input)?;
        let goal = self
            .storage
            .goals
            .get(id)?
            .ok_or_else(|| DompetError::goal_not_found(id.to_string()))?;

        Ok((txn, goal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::DompetPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 1, 15)
    }

    #[test]
    fn test_create_with_initial_amount() {
        let (_temp, storage) = create_test_storage();
        let service = GoalService::new(&storage);

        let goal = service
            .create(
                "Dana Darurat",
                Money::from_rupiah(10_000_000),
                date(2025, 12, 31),
                Some(Money::from_rupiah(2_000_000)),
                today(),
            )
            .unwrap();

        assert_eq!(goal.current_amount, Money::from_rupiah(2_000_000));
        let linked = storage.transactions.get_by_goal(goal.id).unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].category, "Tabungan");
        assert!(linked[0].is_expense());
    }

    #[test]
    fn test_create_rejects_duplicates_and_past_dates() {
        let (_temp, storage) = create_test_storage();
        let service = GoalService::new(&storage);

        service
            .create("Laptop", Money::from_rupiah(1), date(2025, 6, 1), None, today())
            .unwrap();
        let dup = service.create("laptop", Money::from_rupiah(1), date(2025, 6, 1), None, today());
        assert!(matches!(dup, Err(DompetError::Duplicate { .. })));

        let past = service.create("Motor", Money::from_rupiah(1), date(2024, 6, 1), None, today());
        assert!(past.unwrap_err().is_validation());
    }

    #[test]
    fn test_contribute_and_withdraw() {
        let (_temp, storage) = create_test_storage();
        let service = GoalService::new(&storage);
        let goal = service
            .create("Liburan", Money::from_rupiah(3_000_000), date(2025, 7, 1), None, today())
            .unwrap();

        let (_, goal) = service
            .contribute(goal.id, Money::from_rupiah(3_000_000), today(), TransactionSource::Manual)
            .unwrap();
        assert!(goal.is_completed());
        assert!(goal.completed_at.is_some());

        let (txn, goal) = service
            .withdraw(goal.id, Money::from_rupiah(500_000), today(), TransactionSource::Chat)
            .unwrap();
        assert!(txn.is_income());
        assert_eq!(txn.source, TransactionSource::Chat);
        assert_eq!(goal.current_amount, Money::from_rupiah(2_500_000));
        assert!(goal.completed_at.is_none());

        let over = service.withdraw(goal.id, Money::from_rupiah(9_000_000), today(), TransactionSource::Manual);
        assert!(over.unwrap_err().is_validation());
    }

    #[test]
    fn test_list_and_find() {
        let (_temp, storage) = create_test_storage();
        let service = GoalService::new(&storage);
        let done = service
            .create("HP", Money::from_rupiah(1_000), date(2025, 3, 1), Some(Money::from_rupiah(1_000)), today())
            .unwrap();
        service
            .create("Rumah", Money::from_rupiah(500_000_000), date(2030, 1, 1), None, today())
            .unwrap();

        assert_eq!(service.list(false).unwrap().len(), 1);
        assert_eq!(service.list(true).unwrap().len(), 2);
        assert_eq!(service.find("hp").unwrap().unwrap().id, done.id);
        assert_eq!(service.find(&done.id.to_string()).unwrap().unwrap().id, done.id);
        assert!(service.resolve("mobil").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_unlinks_transactions() {
        let (_temp, storage) = create_test_storage();
        let service = GoalService::new(&storage);
        let goal = service
            .create("Laptop", Money::from_rupiah(10_000_000), date(2025, 12, 1), Some(Money::from_rupiah(100_000)), today())
            .unwrap();

        service.delete(goal.id).unwrap();
        assert_eq!(storage.goals.count().unwrap(), 0);

        let txns = storage.transactions.get_all().unwrap();
        assert_eq!(txns.len(), 1);
        assert!(txns[0].goal_id.is_none());
    }

    #[test]
    fn test_update_target_recomputes_completion() {
        let (_temp, storage) = create_test_storage();
        let service = GoalService::new(&storage);
        let goal = service
            .create("Sepeda", Money::from_rupiah(2_000_000), date(2025, 9, 1), Some(Money::from_rupiah(1_500_000)), today())
            .unwrap();

        let updated = service
            .update(
                goal.id,
                UpdateGoalInput {
                    target_amount: Some(Money::from_rupiah(1_000_000)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.completed_at.is_some());
    }
}
