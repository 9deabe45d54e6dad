//! Spending Report
//!
//! Expense analysis by category for an arbitrary date range.

use crate::error::{DompetError, DompetResult};
use crate::models::Money;
use crate::services::{expense_by_category, CategoryTotal};
use crate::storage::Storage;
use chrono::NaiveDate;
use std::io::Write;

/// Spending Report
#[derive(Debug, Clone)]
pub struct SpendingReport {
    /// Start date of the report
    pub start_date: NaiveDate,
    /// End date of the report
    pub end_date: NaiveDate,
    /// Expenses by category, largest first
    pub categories: Vec<CategoryTotal>,
    /// Total spending in the range
    pub total_spending: Money,
    /// Total income in the range
    pub total_income: Money,
    /// Number of expense transactions
    pub expense_count: usize,
}

impl SpendingReport {
    /// Generate a spending report for a date range (inclusive)
    pub fn generate(
        storage: &Storage,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> DompetResult<Self> {
        if end_date < start_date {
            return Err(DompetError::Validation(format!(
                "End date {} is before start date {}",
                end_date, start_date
            )));
        }

        let transactions = storage.transactions.get_by_date_range(start_date, end_date)?;
        let expenses: Vec<_> = transactions.iter().filter(|t| t.is_expense()).collect();

        let total_spending: Money = expenses.iter().map(|t| t.amount).sum();
        let total_income: Money = transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum();

        Ok(Self {
            start_date,
            end_date,
            categories: expense_by_category(expenses.iter().copied()),
            total_spending,
            total_income,
            expense_count: expenses.len(),
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Spending Report: {} to {}\n",
            self.start_date, self.end_date
        ));
        output.push_str(&"=".repeat(70));
        output.push('\n');
        output.push_str(&format!("Total Spending: {}\n", self.total_spending));
        output.push_str(&format!("Total Income: {}\n", self.total_income));
        output.push_str(&format!("Expense Transactions: {}\n\n", self.expense_count));

        if self.categories.is_empty() {
            output.push_str("No expenses in this range.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<30} {:>18} {:>8} {:>8}\n",
            "Category", "Amount", "Count", "%"
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');

        for category in &self.categories {
            output.push_str(&format!(
                "{:<30} {:>18} {:>8} {:>7.1}%\n",
                category.category,
                category.amount.to_string(),
                category.count,
                category.percent
            ));
        }

        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{:<30} {:>18} {:>8}\n",
            "TOTAL SPENDING",
            self.total_spending.to_string(),
            self.expense_count
        ));

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: W) -> DompetResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["Start Date", "End Date", "Category", "Amount", "Count", "Percentage"])?;

        for category in &self.categories {
            csv_writer.write_record([
                self.start_date.to_string(),
                self.end_date.to_string(),
                category.category.clone(),
                format!("{:.2}", category.amount.as_major_f64()),
                category.count.to_string(),
                format!("{:.2}", category.percent),
            ])?;
        }

        csv_writer.write_record([
            self.start_date.to_string(),
            self.end_date.to_string(),
            "TOTAL".to_string(),
            format!("{:.2}", self.total_spending.as_major_f64()),
            self.expense_count.to_string(),
            "100.00".to_string(),
        ])?;

        csv_writer
            .flush()
            .map_err(|e| DompetError::Export(e.to_string()))?;
        Ok(())
    }

    /// Get top spending categories
    pub fn top_categories(&self, limit: usize) -> &[CategoryTotal] {
        &self.categories[..limit.min(self.categories.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::DompetPaths;
    use crate::models::Transaction;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn test_generate_spending_report() {
        let (_temp_dir, storage) = create_test_storage();

        for txn in [
            Transaction::expense(Money::from_rupiah(50_000), "Belanja", date(1, 10)),
            Transaction::expense(Money::from_rupiah(30_000), "Hiburan", date(1, 15)),
            Transaction::expense(Money::from_rupiah(20_000), "Belanja", date(1, 20)),
            Transaction::expense(Money::from_rupiah(99_000), "Belanja", date(2, 1)),
            Transaction::income(Money::from_rupiah(2_000_000), "Gaji", date(1, 1)),
        ] {
            storage.transactions.upsert(txn).unwrap();
        }

        let report = SpendingReport::generate(&storage, date(1, 1), date(1, 31)).unwrap();

        assert_eq!(report.total_spending, Money::from_rupiah(100_000));
        assert_eq!(report.total_income, Money::from_rupiah(2_000_000));
        assert_eq!(report.expense_count, 3);
        assert_eq!(report.categories.len(), 2);
        assert_eq!(report.categories[0].category, "Belanja");
        assert!((report.categories[0].percent - 70.0).abs() < 1e-9);
        assert_eq!(report.top_categories(1).len(), 1);
        assert_eq!(report.top_categories(10).len(), 2);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let (_temp_dir, storage) = create_test_storage();
        let result = SpendingReport::generate(&storage, date(2, 1), date(1, 1));
        assert!(result.unwrap_err().is_validation());
    }

    #[test]
    fn test_export_csv() {
        let (_temp_dir, storage) = create_test_storage();
        storage
            .transactions
            .upsert(Transaction::expense(Money::from_rupiah(12_500), "Transportasi", date(1, 3)))
            .unwrap();

        let report = SpendingReport::generate(&storage, date(1, 1), date(1, 31)).unwrap();
        let mut buffer = Vec::new();
        report.export_csv(&mut buffer).unwrap();

        let csv = String::from_utf8(buffer).unwrap();
        assert!(csv.starts_with("Start Date,End Date,Category,Amount,Count,Percentage"));
        assert!(csv.contains("2025-01-01,2025-01-31,Transportasi,12500.00,1,100.00"));
        assert!(csv.contains("TOTAL,12500.00,1,100.00"));
    }
}
