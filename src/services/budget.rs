//! Budget service
//!
//! Monthly per-category spending caps and their status against actual
//! expenses.

use crate::audit::EntityType;
use crate::error::{DompetError, DompetResult};
use crate::models::{
    normalize_category, same_category, Budget, BudgetId, BudgetStatus, Money, Month,
    TransactionKind,
};
use crate::storage::Storage;

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
    warning_percent: u32,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage, warning_percent: u32) -> Self {
        Self {
            storage,
            warning_percent,
        }
    }

    /// Create the budget for (category, month), or change its amount
    pub fn set(&self, category: &str, month: Month, amount: Money) -> DompetResult<Budget> {
        let category = normalize_category(TransactionKind::Expense, category)
            .ok_or_else(|| DompetError::Validation("Budget category is required".into()))?;

        if let Some(before) = self.storage.budgets.find(&category, month)? {
            let mut budget = before.clone();
            budget.set_amount(amount);
            budget
                .validate()
                .map_err(|e| DompetError::Validation(e.to_string()))?;

            self.storage.budgets.upsert(budget.clone())?;
            self.storage.budgets.save()?;
            self.storage.log_update(
                EntityType::Budget,
                budget.id.to_string(),
                Some(format!("{} {}", budget.category, budget.month)),
                &before,
                &budget,
                Some(format!("amount: {} -> {}", before.amount, budget.amount)),
            )?;
            return Ok(budget);
        }

        let budget = Budget::new(category, month, amount);
        budget
            .validate()
            .map_err(|e| DompetError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;
        self.storage.log_create(
            EntityType::Budget,
            budget.id.to_string(),
            Some(format!("{} {}", budget.category, budget.month)),
            &budget,
        )?;

        Ok(budget)
    }

    pub fn delete(&self, id: BudgetId) -> DompetResult<Budget> {
        let budget = self
            .storage
            .budgets
            .delete(id)?
            .ok_or_else(|| DompetError::budget_not_found(id.to_string()))?;
        self.storage.budgets.save()?;

        self.storage.log_delete(
            EntityType::Budget,
            budget.id.to_string(),
            Some(format!("{} {}", budget.category, budget.month)),
            &budget,
        )?;

        Ok(budget)
    }

    pub fn find(&self, category: &str, month: Month) -> DompetResult<Option<Budget>> {
        self.storage.budgets.find(category, month)
    }

    /// Find by ID, or by category name within a month
    pub fn resolve(&self, identifier: &str, month: Month) -> DompetResult<Option<Budget>> {
        if let Some(budget) = self.storage.budgets.find_by_id(identifier)? {
            return Ok(Some(budget));
        }
        let category = normalize_category(TransactionKind::Expense, identifier)
            .unwrap_or_else(|| identifier.to_string());
        self.storage.budgets.find(&category, month)
    }

    pub fn list(&self, month: Month) -> DompetResult<Vec<Budget>> {
        self.storage.budgets.get_for_month(month)
    }

    /// Total expenses in a category for a month
    pub fn spent(&self, category: &str, month: Month) -> DompetResult<Money> {
        Ok(self
            .storage
            .transactions
            .get_by_month(month)?
            .iter()
            .filter(|t| t.is_expense() && same_category(&t.category, category))
            .map(|t| t.amount)
            .sum())
    }

    /// Status of every budget in a month, most used first
    pub fn status(&self, month: Month) -> DompetResult<Vec<BudgetStatus>> {
        let expenses: Vec<_> = self
            .storage
            .transactions
            .get_by_month(month)?
            .into_iter()
            .filter(|t| t.is_expense())
            .collect();

        let mut statuses: Vec<_> = self
            .list(month)?
            .into_iter()
            .map(|budget| {
                let spent = expenses
                    .iter()
                    .filter(|t| same_category(&t.category, &budget.category))
                    .map(|t| t.amount)
                    .sum();
                BudgetStatus::compute(budget, spent, self.warning_percent)
            })
            .collect();

        statuses.sort_by(|a, b| {
            b.percent_used
                .partial_cmp(&a.percent_used)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(statuses)
    }

    pub fn status_for(&self, category: &str, month: Month) -> DompetResult<Option<BudgetStatus>> {
        match self.find(category, month)? {
            Some(budget) => {
                let spent = self.spent(&budget.category, month)?;
                Ok(Some(BudgetStatus::compute(budget, spent, self.warning_percent)))
            }
            None => Ok(None),
        }
    }

    /// Copy last month's budgets into `month` for categories without one
    ///
    /// Returns the number of budgets created.
    pub fn copy_from_previous(&self, month: Month) -> DompetResult<usize> {
        let mut created = 0;
        for previous in self.list(month.prev())? {
            if self.find(&previous.category, month)?.is_none() {
                self.set(&previous.category, month, previous.amount)?;
                created += 1;
            }
        }
        Ok(created)
    }
}
