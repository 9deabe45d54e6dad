//! Monthly Report
//!
//! The full picture of one month: totals, category breakdowns, a daily
//! expense series, budget status, goals, bills due and every transaction.
//! Rendered for the terminal or as a printable markdown document.

use chrono::{Duration, NaiveDate};

use crate::config::settings::Settings;
use crate::error::DompetResult;
use crate::models::{Bill, BudgetStatus, Goal, Money, Month, Transaction};
use crate::services::{expense_by_category, BudgetService, CategoryTotal};
use crate::storage::Storage;

/// Expenses recorded on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyExpense {
    pub date: NaiveDate,
    pub amount: Money,
}

/// Monthly Report
#[derive(Debug, Clone)]
pub struct MonthlyReport {
    pub month: Month,
    pub currency_symbol: String,
    pub total_income: Money,
    pub total_expense: Money,
    pub balance: Money,
    pub savings_rate: f64,
    pub expense_categories: Vec<CategoryTotal>,
    pub income_categories: Vec<CategoryTotal>,
    /// One entry per calendar day of the month
    pub daily_expenses: Vec<DailyExpense>,
    pub budgets: Vec<BudgetStatus>,
    pub goals: Vec<Goal>,
    /// Active bills whose due date falls in the month
    pub bills_due: Vec<Bill>,
    /// Oldest first
    pub transactions: Vec<Transaction>,
}

impl MonthlyReport {
    pub fn generate(storage: &Storage, month: Month, settings: &Settings) -> DompetResult<Self> {
        let mut transactions = storage.transactions.get_by_month(month)?;
        transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

        let total_income: Money = transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum();
        let total_expense: Money = transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum();
        let balance = total_income - total_expense;
        let savings_rate = if total_income.is_positive() {
            balance.percent_of(total_income)
        } else {
            0.0
        };

        let mut daily_expenses = Vec::with_capacity(month.days() as usize);
        let mut day = month.start_date();
        while day <= month.end_date() {
            let amount = transactions
                .iter()
                .filter(|t| t.is_expense() && t.date == day)
                .map(|t| t.amount)
                .sum();
            daily_expenses.push(DailyExpense { date: day, amount });
            day += Duration::days(1);
        }

        let budgets = BudgetService::new(storage, settings.notifications.budget_warning_percent)
            .status(month)?;

        let bills_due = storage
            .bills
            .get_active()?
            .into_iter()
            .filter(|b| month.contains(b.due_date))
            .collect();

        Ok(Self {
            month,
            currency_symbol: settings.currency_symbol.clone(),
            total_income,
            total_expense,
            balance,
            savings_rate,
            expense_categories: expense_by_category(transactions.iter().filter(|t| t.is_expense())),
            income_categories: expense_by_category(transactions.iter().filter(|t| t.is_income())),
            daily_expenses,
            budgets,
            goals: storage.goals.get_all()?,
            bills_due,
            transactions,
        })
    }

    fn money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    /// Day with the highest spending, if anything was spent
    pub fn peak_day(&self) -> Option<DailyExpense> {
        self.daily_expenses
            .iter()
            .filter(|d| d.amount.is_positive())
            .max_by(|a, b| a.amount.cmp(&b.amount).then(b.date.cmp(&a.date)))
            .copied()
    }

    /// Average spending per calendar day
    pub fn average_daily_expense(&self) -> Money {
        let days = self.daily_expenses.len().max(1) as i64;
        Money::from_minor(self.total_expense.minor() / days)
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Monthly Report: {}\n", self.month.display_name()));
        output.push_str(&"=".repeat(70));
        output.push('\n');
        output.push_str(&format!("{:<20} {:>20}\n", "Income", self.money(self.total_income)));
        output.push_str(&format!("{:<20} {:>20}\n", "Expenses", self.money(self.total_expense)));
        output.push_str(&format!("{:<20} {:>20}\n", "Balance", self.money(self.balance)));
        output.push_str(&format!("{:<20} {:>19.1}%\n", "Savings Rate", self.savings_rate));
        output.push_str(&format!(
            "{:<20} {:>20}\n",
            "Avg / Day",
            self.money(self.average_daily_expense())
        ));
        if let Some(peak) = self.peak_day() {
            output.push_str(&format!(
                "{:<20} {:>20}\n",
                format!("Peak ({})", peak.date.format("%d %b")),
                self.money(peak.amount)
            ));
        }

        self.push_categories_terminal(&mut output, "EXPENSES BY CATEGORY", &self.expense_categories);
        self.push_categories_terminal(&mut output, "INCOME BY CATEGORY", &self.income_categories);

        if !self.budgets.is_empty() {
            output.push_str("\nBUDGETS\n");
            output.push_str(&"-".repeat(70));
            output.push('\n');
            for status in &self.budgets {
                output.push_str(&format!(
                    "{:<24} {:>16} / {:<16} {:>5.0}% {}\n",
                    status.budget.category,
                    self.money(status.spent),
                    self.money(status.budget.amount),
                    status.percent_used,
                    status.state
                ));
            }
        }

        if !self.goals.is_empty() {
            output.push_str("\nGOALS\n");
            output.push_str(&"-".repeat(70));
            output.push('\n');
            for goal in &self.goals {
                output.push_str(&format!(
                    "{:<24} {:>16} / {:<16} {:>5.0}%\n",
                    goal.name,
                    self.money(goal.current_amount),
                    self.money(goal.target_amount),
                    goal.progress_percent()
                ));
            }
        }

        if !self.bills_due.is_empty() {
            output.push_str("\nBILLS DUE\n");
            output.push_str(&"-".repeat(70));
            output.push('\n');
            for bill in &self.bills_due {
                output.push_str(&format!(
                    "{:<24} {:>16} {}\n",
                    bill.name,
                    self.money(bill.amount),
                    bill.due_date
                ));
            }
        }

        output.push_str(&format!("\nTRANSACTIONS ({})\n", self.transactions.len()));
        output.push_str(&"-".repeat(70));
        output.push('\n');
        for txn in &self.transactions {
            let sign = if txn.is_income() { "+" } else { "-" };
            output.push_str(&format!(
                "{} {:<22} {:<24} {}{}\n",
                txn.date,
                txn.category,
                truncate(&txn.description, 24),
                sign,
                self.money(txn.amount)
            ));
        }

        output
    }

    fn push_categories_terminal(&self, output: &mut String, title: &str, rows: &[CategoryTotal]) {
        if rows.is_empty() {
            return;
        }
        output.push_str(&format!("\n{}\n", title));
        output.push_str(&"-".repeat(70));
        output.push('\n');
        for row in rows {
            output.push_str(&format!(
                "{:<30} {:>18} {:>6} {:>7.1}%\n",
                row.category,
                self.money(row.amount),
                row.count,
                row.percent
            ));
        }
    }

    /// Format the report as a printable markdown document
    pub fn format_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# Laporan Keuangan {}\n\n", self.month.display_name()));

        md.push_str("## Ringkasan\n\n");
        md.push_str("| | |\n|---|---:|\n");
        md.push_str(&format!("| Pemasukan | {} |\n", self.money(self.total_income)));
        md.push_str(&format!("| Pengeluaran | {} |\n", self.money(self.total_expense)));
        md.push_str(&format!("| Saldo | {} |\n", self.money(self.balance)));
        md.push_str(&format!("| Rasio Tabungan | {:.1}% |\n", self.savings_rate));
        md.push_str(&format!(
            "| Rata-rata Harian | {} |\n\n",
            self.money(self.average_daily_expense())
        ));

        self.push_categories_markdown(&mut md, "Pengeluaran per Kategori", &self.expense_categories);
        self.push_categories_markdown(&mut md, "Pemasukan per Kategori", &self.income_categories);

        let spending_days: Vec<_> = self
            .daily_expenses
            .iter()
            .filter(|d| d.amount.is_positive())
            .collect();
        if !spending_days.is_empty() {
            md.push_str("## Pengeluaran Harian\n\n");
            md.push_str("| Tanggal | Jumlah |\n|---|---:|\n");
            for day in spending_days {
                md.push_str(&format!("| {} | {} |\n", day.date, self.money(day.amount)));
            }
            md.push('\n');
        }

        if !self.budgets.is_empty() {
            md.push_str("## Anggaran\n\n");
            md.push_str("| Kategori | Terpakai | Anggaran | % | Status |\n|---|---:|---:|---:|---|\n");
            for status in &self.budgets {
                md.push_str(&format!(
                    "| {} | {} | {} | {:.0}% | {} |\n",
                    escape(&status.budget.category),
                    self.money(status.spent),
                    self.money(status.budget.amount),
                    status.percent_used,
                    status.state
                ));
            }
            md.push('\n');
        }

        if !self.goals.is_empty() {
            md.push_str("## Target Tabungan\n\n");
            md.push_str("| Target | Terkumpul | Tujuan | Progres | Tenggat |\n|---|---:|---:|---:|---|\n");
            for goal in &self.goals {
                md.push_str(&format!(
                    "| {} | {} | {} | {:.0}% | {} |\n",
                    escape(&goal.name),
                    self.money(goal.current_amount),
                    self.money(goal.target_amount),
                    goal.progress_percent(),
                    goal.target_date
                ));
            }
            md.push('\n');
        }

        if !self.bills_due.is_empty() {
            md.push_str("## Tagihan Bulan Ini\n\n");
            md.push_str("| Tagihan | Jumlah | Jatuh Tempo |\n|---|---:|---|\n");
            for bill in &self.bills_due {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    escape(&bill.name),
                    self.money(bill.amount),
                    bill.due_date
                ));
            }
            md.push('\n');
        }

        md.push_str("## Transaksi\n\n");
        if self.transactions.is_empty() {
            md.push_str("_Tidak ada transaksi._\n");
        } else {
            md.push_str("| Tanggal | Jenis | Kategori | Keterangan | Jumlah |\n|---|---|---|---|---:|\n");
            for txn in &self.transactions {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    txn.date,
                    txn.kind.label(),
                    escape(&txn.category),
                    escape(&txn.description),
                    self.money(txn.amount)
                ));
            }
        }

        md
    }

    fn push_categories_markdown(&self, md: &mut String, title: &str, rows: &[CategoryTotal]) {
        if rows.is_empty() {
            return;
        }
        md.push_str(&format!("## {}\n\n", title));
        md.push_str("| Kategori | Jumlah | Transaksi | % |\n|---|---:|---:|---:|\n");
        for row in rows {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% |\n",
                escape(&row.category),
                self.money(row.amount),
                row.count,
                row.percent
            ));
        }
        md.push('\n');
    }
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
