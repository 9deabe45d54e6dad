//! Dashboard summaries

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DompetResult;
use crate::models::{Bill, BudgetState, Goal, Money, Month};
use crate::storage::Storage;

use super::bill::BillService;
use super::budget::BudgetService;

/// Days ahead to include in the upcoming-bills list
const UPCOMING_BILL_DAYS: i64 = 7;

/// Number of categories listed in the top expenses
const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Money,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BudgetCounts {
    pub on_track: usize,
    pub warning: usize,
    pub exceeded: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    pub name: String,
    pub current: Money,
    pub target: Money,
    pub percent: f64,
    pub days_left: i64,
}

impl GoalProgress {
    fn from_goal(goal: &Goal, today: NaiveDate) -> Self {
        Self {
            name: goal.name.clone(),
            current: goal.current_amount,
            target: goal.target_amount,
            percent: goal.progress_percent(),
            days_left: goal.days_left(today),
        }
    }
}

/// One month at a glance
#[derive(Debug, Clone, Serialize)]
pub struct MonthSummary {
    pub month: Month,
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
    /// Share of income not spent, in percent (0 when there is no income)
    pub savings_rate: f64,
    pub transaction_count: usize,
    pub top_categories: Vec<CategoryTotal>,
    pub budgets: BudgetCounts,
    pub upcoming_bills: Vec<Bill>,
    pub goals: Vec<GoalProgress>,
}

/// Group expenses by category, largest first
pub fn expense_by_category<'t, I>(transactions: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'t crate::models::Transaction>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for txn in transactions.into_iter() {
        match totals
            .iter_mut()
            .find(|t| crate::models::same_category(&t.category, &txn.category))
        {
            Some(total) => {
                total.amount += txn.amount;
                total.count += 1;
            }
            None => totals.push(CategoryTotal {
                category: txn.category.clone(),
                amount: txn.amount,
                count: 1,
                percent: 0.0,
            }),
        }
    }

    let grand_total: Money = totals.iter().map(|t| t.amount).sum();
    for total in &mut totals {
        total.percent = total.amount.percent_of(grand_total);
    }
    totals.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    totals
}

pub struct SummaryService<'a> {
    storage: &'a Storage,
    warning_percent: u32,
}

impl<'a> SummaryService<'a> {
    pub fn new(storage: &'a Storage, warning_percent: u32) -> Self {
        Self {
            storage,
            warning_percent,
        }
    }

    pub fn month_summary(&self, month: Month, today: NaiveDate) -> DompetResult<MonthSummary> {
        let transactions = self.storage.transactions.get_by_month(month)?;

        let income: Money = transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum();
        let expense: Money = transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum();
        let balance = income - expense;
        let savings_rate = if income.is_positive() {
            balance.percent_of(income)
        } else {
            0.0
        };

        let mut top_categories = expense_by_category(transactions.iter().filter(|t| t.is_expense()));
        top_categories.truncate(TOP_CATEGORIES);

        let mut budgets = BudgetCounts::default();
        for status in BudgetService::new(self.storage, self.warning_percent).status(month)? {
            match status.state {
                BudgetState::OnTrack => budgets.on_track += 1,
                BudgetState::Warning => budgets.warning += 1,
                BudgetState::Exceeded => budgets.exceeded += 1,
            }
        }

        let upcoming_bills = BillService::new(self.storage).upcoming(today, UPCOMING_BILL_DAYS)?;

        let goals = self
            .storage
            .goals
            .get_all()?
            .iter()
            .filter(|g| !g.is_completed())
            .map(|g| GoalProgress::from_goal(g, today))
            .collect();

        Ok(MonthSummary {
            month,
            income,
            expense,
            balance,
            savings_rate,
            transaction_count: transactions.len(),
            top_categories,
            budgets,
            upcoming_bills,
            goals,
        })
    }

    /// All-time income minus expenses
    pub fn overall_balance(&self) -> DompetResult<Money> {
        Ok(self
            .storage
            .transactions
            .get_all()?
            .iter()
            .map(|t| t.signed_amount())
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::DompetPaths;
    use crate::models::{BillFrequency, Transaction};
    use tempfile::TempDir;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn test_month_summary() {
        let temp = TempDir::new().unwrap();
        let mut storage = Storage::new(DompetPaths::with_base_dir(temp.path().to_path_buf())).unwrap();
        storage.load_all().unwrap();

        let jan = Month::new(2025, 1).unwrap();
        for txn in [
            Transaction::income(Money::from_rupiah(10_000_000), "Gaji", date(1, 1)),
            Transaction::expense(Money::from_rupiah(1_500_000), "Makanan & Minuman", date(1, 3)),
            Transaction::expense(Money::from_rupiah(500_000), "makanan & minuman", date(1, 4)),
            Transaction::expense(Money::from_rupiah(500_000), "Transportasi", date(1, 5)),
            Transaction::expense(Money::from_rupiah(99_000), "Hiburan", date(2, 1)),
        ] {
            storage.transactions.upsert(txn).unwrap();
        }
        BudgetService::new(&storage, 80)
            .set("Transportasi", jan, Money::from_rupiah(400_000))
            .unwrap();
        storage
            .bills
            .upsert(Bill::new("Internet", Money::from_rupiah(300_000), date(1, 12), BillFrequency::Monthly))
            .unwrap();

        let summary = SummaryService::new(&storage, 80)
            .month_summary(jan, date(1, 10))
            .unwrap();

        assert_eq!(summary.income, Money::from_rupiah(10_000_000));
        assert_eq!(summary.expense, Money::from_rupiah(2_500_000));
        assert_eq!(summary.balance, Money::from_rupiah(7_500_000));
        assert!((summary.savings_rate - 75.0).abs() < 1e-9);
        assert_eq!(summary.transaction_count, 4);
        assert_eq!(summary.top_categories[0].category, "Makanan & Minuman");
        assert_eq!(summary.top_categories[0].count, 2);
        assert!((summary.top_categories[0].percent - 80.0).abs() < 1e-9);
        assert_eq!(summary.budgets.exceeded, 1);
        assert_eq!(summary.upcoming_bills.len(), 1);

        let overall = SummaryService::new(&storage, 80).overall_balance().unwrap();
        assert_eq!(overall, Money::from_rupiah(7_401_000));
    }
}
