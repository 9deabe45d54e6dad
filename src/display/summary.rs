//! Dashboard summary formatting

use chrono::NaiveDate;

use crate::models::Money;
use crate::services::MonthSummary;

use super::{progress_bar, truncate};

/// Render the dashboard for one month
///
/// `overall_balance` is the all-time balance shown on top.
pub fn format_month_summary(
    summary: &MonthSummary,
    overall_balance: Money,
    today: NaiveDate,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Summary: {}\n", summary.month.display_name()));
    output.push_str(&"=".repeat(50));
    output.push('\n');
    output.push_str(&format!("{:<20} {:>18}\n", "Overall balance:", overall_balance.to_string()));
    output.push_str(&format!("{:<20} {:>18}\n", "Income:", summary.income.to_string()));
    output.push_str(&format!("{:<20} {:>18}\n", "Expense:", summary.expense.to_string()));
    output.push_str(&format!("{:<20} {:>18}\n", "Balance:", summary.balance.to_string()));
    output.push_str(&format!("{:<20} {:>17.1}%\n", "Savings rate:", summary.savings_rate));
    output.push_str(&format!("{:<20} {:>18}\n", "Transactions:", summary.transaction_count));

    if !summary.top_categories.is_empty() {
        output.push_str("\nTop expenses\n");
        output.push_str(&"-".repeat(50));
        output.push('\n');
        for c in &summary.top_categories {
            output.push_str(&format!(
                "{:<22} {:>15} {:>6.1}%\n",
                truncate(&c.category, 22),
                c.amount.to_string(),
                c.percent
            ));
        }
    }

    let b = &summary.budgets;
    if b.on_track + b.warning + b.exceeded > 0 {
        output.push_str(&format!(
            "\nBudgets: {} on track, {} warning, {} exceeded\n",
            b.on_track, b.warning, b.exceeded
        ));
    }

    if !summary.upcoming_bills.is_empty() {
        output.push_str("\nUpcoming bills\n");
        output.push_str(&"-".repeat(50));
        output.push('\n');
        for bill in &summary.upcoming_bills {
            let days = bill.days_until_due(today);
            let when = if days < 0 {
                format!("{}d late", -days)
            } else if days == 0 {
                "today".to_string()
            } else {
                format!("in {}d", days)
            };
            output.push_str(&format!(
                "{:<22} {:>15} {:>10}\n",
                truncate(&bill.name, 22),
                bill.amount.to_string(),
                when
            ));
        }
    }

    if !summary.goals.is_empty() {
        output.push_str("\nGoals\n");
        output.push_str(&"-".repeat(50));
        output.push('\n');
        for goal in &summary.goals {
            output.push_str(&format!(
                "{:<22} {} {:>5.1}%\n",
                truncate(&goal.name, 22),
                progress_bar(goal.percent, 16),
                goal.percent
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Month;
    use crate::services::summary::BudgetCounts;

    #[test]
    fn test_empty_month() {
        let summary = MonthSummary {
            month: Month::new(2025, 1).unwrap(),
            income: Money::zero(),
            expense: Money::zero(),
            balance: Money::zero(),
            savings_rate: 0.0,
            transaction_count: 0,
            top_categories: Vec::new(),
            budgets: BudgetCounts::default(),
            upcoming_bills: Vec::new(),
            goals: Vec::new(),
        };

        let output = format_month_summary(
            &summary,
            Money::from_rupiah(1_000),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        );
        assert!(output.starts_with("Summary: Januari 2025"));
        assert!(output.contains("Rp1.000"));
        assert!(!output.contains("Top expenses"));
        assert!(!output.contains("Budgets:"));
    }
}
