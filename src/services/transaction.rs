//! Transaction service
//!
//! Business logic for recording income and expenses, including keeping
//! savings goals in step with the transactions linked to them.

use chrono::NaiveDate;
use tracing::debug;

use crate::audit::EntityType;
use crate::error::{DompetError, DompetResult};
use crate::models::{
    normalize_category, same_category, BillId, Goal, GoalId, Money, Transaction, TransactionId,
    TransactionKind, TransactionSource,
};
use crate::storage::Storage;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive text searched in description and category
    pub search: Option<String>,
    pub goal_id: Option<GoalId>,
    pub bill_id: Option<BillId>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn goal(mut self, goal_id: GoalId) -> Self {
        self.goal_id = Some(goal_id);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, txn: &Transaction) -> bool {
        if self.kind.is_some_and(|k| k != txn.kind) {
            return false;
        }
        if let Some(category) = &self.category {
            if !same_category(category, &txn.category) {
                return false;
            }
        }
        if self.start_date.is_some_and(|start| txn.date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| txn.date > end) {
            return false;
        }
        if let Some(text) = &self.search {
            if !txn.matches_search(text) {
                return false;
            }
        }
        if self.goal_id.is_some() && txn.goal_id != self.goal_id {
            return false;
        }
        if self.bill_id.is_some() && txn.bill_id != self.bill_id {
            return false;
        }
        true
    }
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub kind: TransactionKind,
    pub amount: Money,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub goal_id: Option<GoalId>,
    pub bill_id: Option<BillId>,
    pub source: TransactionSource,
}

impl CreateTransactionInput {
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            amount,
            category: category.into(),
            description: None,
            date,
            goal_id: None,
            bill_id: None,
            source: TransactionSource::Manual,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn source(mut self, source: TransactionSource) -> Self {
        self.source = source;
        self
    }
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    pub kind: Option<TransactionKind>,
    pub amount: Option<Money>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Effect of a goal-linked transaction on the goal's savings
///
/// Expenses are contributions, incomes are withdrawals.
fn goal_delta(txn: &Transaction) -> Money {
    match txn.goal_id {
        None => Money::zero(),
        Some(_) => match txn.kind {
            TransactionKind::Expense => txn.amount,
            TransactionKind::Income => -txn.amount,
        },
    }
}

/// Apply a change in savings to a goal, refusing to go below zero
fn adjust_goal(goal: &mut Goal, delta: Money) -> DompetResult<()> {
    if delta.is_positive() {
        goal.contribute(delta);
    } else if delta.is_negative() {
        goal.withdraw(delta.abs())
            .map_err(|e| DompetError::Validation(e.to_string()))?;
    }
    Ok(())
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a transaction
    ///
    /// A goal-linked transaction updates the goal's savings in the same step.
    pub fn create(&self, input: CreateTransactionInput) -> DompetResult<Transaction> {
        let category = normalize_category(input.kind, &input.category)
            .ok_or_else(|| DompetError::Validation("Category is required".into()))?;

        let mut txn = Transaction::new(input.kind, input.amount, category, input.date);
        if let Some(description) = input.description {
            txn.description = description.trim().to_string();
        }
        txn.goal_id = input.goal_id;
        txn.bill_id = input.bill_id;
        txn.source = input.source;

        txn.validate()
            .map_err(|e| DompetError::Validation(e.to_string()))?;

        if let Some(bill_id) = txn.bill_id {
            self.storage
                .bills
                .get(bill_id)?
                .ok_or_else(|| DompetError::bill_not_found(bill_id.to_string()))?;
        }

        let goal_update = match txn.goal_id {
            Some(goal_id) => {
                let before = self
                    .storage
                    .goals
                    .get(goal_id)?
                    .ok_or_else(|| DompetError::goal_not_found(goal_id.to_string()))?;
                let mut after = before.clone();
                adjust_goal(&mut after, goal_delta(&txn))?;
                Some((before, after))
            }
            None => None,
        };

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &txn,
        )?;

        if let Some((before, after)) = goal_update {
            self.save_goal(&before, &after)?;
        }

        debug!(id = %txn.id, kind = %txn.kind, amount = %txn.amount, "transaction created");
        Ok(txn)
    }

    pub fn get(&self, id: TransactionId) -> DompetResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    /// Find by full or short ID
    pub fn find(&self, identifier: &str) -> DompetResult<Option<Transaction>> {
        self.storage.transactions.find(identifier)
    }

    /// Transactions matching a filter, newest first
    pub fn list(&self, filter: TransactionFilter) -> DompetResult<Vec<Transaction>> {
        let mut transactions: Vec<_> = self
            .storage
            .transactions
            .get_all()?
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();

        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }

        Ok(transactions)
    }

    /// Update fields of a transaction
    pub fn update(
        &self,
        id: TransactionId,
        input: UpdateTransactionInput,
    ) -> DompetResult<Transaction> {
        let before = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| DompetError::transaction_not_found(id.to_string()))?;

        let mut txn = before.clone();
        if let Some(kind) = input.kind {
            txn.kind = kind;
        }
        if let Some(amount) = input.amount {
            txn.amount = amount;
        }
        if let Some(category) = input.category {
            txn.category = category;
        }
        txn.category = normalize_category(txn.kind, &txn.category)
            .ok_or_else(|| DompetError::Validation("Category is required".into()))?;
        if let Some(description) = input.description {
            txn.description = description.trim().to_string();
        }
        if let Some(date) = input.date {
            txn.date = date;
        }
        txn.touch();

        txn.validate()
            .map_err(|e| DompetError::Validation(e.to_string()))?;

        let goal_update = match txn.goal_id {
            Some(goal_id) => match self.storage.goals.get(goal_id)? {
                Some(goal_before) => {
                    let net = goal_delta(&txn) - goal_delta(&before);
                    let mut goal_after = goal_before.clone();
                    adjust_goal(&mut goal_after, net)?;
                    Some((goal_before, goal_after))
                }
                None => None,
            },
            None => None,
        };

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_update(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &before,
            &txn,
            None,
        )?;

        if let Some((goal_before, goal_after)) = goal_update {
            self.save_goal(&goal_before, &goal_after)?;
        }

        Ok(txn)
    }

    /// Delete a transaction, undoing its effect on a linked goal
    pub fn delete(&self, id: TransactionId) -> DompetResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| DompetError::transaction_not_found(id.to_string()))?;

        let goal_update = match txn.goal_id {
            Some(goal_id) => match self.storage.goals.get(goal_id)? {
                Some(goal_before) => {
                    let mut goal_after = goal_before.clone();
                    adjust_goal(&mut goal_after, -goal_delta(&txn))?;
                    Some((goal_before, goal_after))
                }
                None => None,
            },
            None => None,
        };

        self.storage.transactions.delete(id)?;
        self.storage.transactions.save()?;

        self.storage.log_delete(
            EntityType::Transaction,
            id.to_string(),
            Some(txn.to_string()),
            &txn,
        )?;

        if let Some((goal_before, goal_after)) = goal_update {
            self.save_goal(&goal_before, &goal_after)?;
        }

        Ok(txn)
    }

    /// Income and expense totals for a date range (inclusive)
    pub fn totals(&self, start: NaiveDate, end: NaiveDate) -> DompetResult<(Money, Money)> {
        let transactions = self.storage.transactions.get_by_date_range(start, end)?;
        let income = transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum();
        let expense = transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum();
        Ok((income, expense))
    }

    fn save_goal(&self, before: &Goal, after: &Goal) -> DompetResult<()> {
        self.storage.goals.upsert(after.clone())?;
        self.storage.goals.save()?;
        self.storage.log_update(
            EntityType::Goal,
            after.id.to_string(),
            Some(after.name.clone()),
            before,
            after,
            Some(format!(
                "current_amount: {} -> {}",
                before.current_amount, after.current_amount
            )),
        )
    }
}
