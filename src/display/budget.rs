//! Budget display formatting

use tabled::Tabled;

use crate::models::{BudgetState, BudgetStatus, Money};

use super::{progress_bar, render_table};

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Limit")]
    limit: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Budget statuses for one month, with totals
pub fn format_budget_table(statuses: &[BudgetStatus]) -> String {
    if statuses.is_empty() {
        return "No budgets set for this month.\n".to_string();
    }

    let rows: Vec<BudgetRow> = statuses
        .iter()
        .map(|s| BudgetRow {
            category: s.budget.category.clone(),
            limit: s.budget.amount.to_string(),
            spent: s.spent.to_string(),
            remaining: s.remaining.to_string(),
            used: format!("{} {:>5.1}%", progress_bar(s.percent_used, 10), s.percent_used),
            status: match s.state {
                BudgetState::OnTrack => s.state.to_string(),
                _ => format!("{} !", s.state),
            },
        })
        .collect();

    let limit: Money = statuses.iter().map(|s| s.budget.amount).sum();
    let spent: Money = statuses.iter().map(|s| s.spent).sum();
    let exceeded = statuses.iter().filter(|s| s.is_exceeded()).count();

    let mut output = render_table(rows, &[1, 2, 3]);
    output.push('\n');
    output.push_str(&format!(
        "Total: {} of {} ({:.1}%)\n",
        spent,
        limit,
        spent.percent_of(limit)
    ));
    if exceeded > 0 {
        output.push_str(&format!("{} budget(s) exceeded.\n", exceeded));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, Month};

    #[test]
    fn test_budget_table() {
        let month = Month::new(2025, 1).unwrap();
        let statuses = vec![
            BudgetStatus::compute(
                Budget::new("Hiburan", month, Money::from_rupiah(100_000)),
                Money::from_rupiah(120_000),
                80,
            ),
            BudgetStatus::compute(
                Budget::new("Transportasi", month, Money::from_rupiah(400_000)),
                Money::from_rupiah(100_000),
                80,
            ),
        ];

        let table = format_budget_table(&statuses);
        assert!(table.contains("Hiburan"));
        assert!(table.contains("Terlampaui !"));
        assert!(table.contains("-Rp20.000"));
        assert!(table.contains("1 budget(s) exceeded."));
    }
}
