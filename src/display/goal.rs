//! Savings goal display formatting

use chrono::NaiveDate;
use tabled::Tabled;

use crate::models::{Goal, Transaction};

use super::{progress_bar, render_table, truncate};

#[derive(Tabled)]
struct GoalRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Saved")]
    saved: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
}

fn deadline_text(goal: &Goal, today: NaiveDate) -> String {
    if goal.is_completed() {
        return "completed".to_string();
    }
    let days = goal.days_left(today);
    if days < 0 {
        format!("{} ({} days late)", goal.target_date, -days)
    } else {
        format!("{} ({} days)", goal.target_date, days)
    }
}

pub fn format_goal_table(goals: &[Goal], today: NaiveDate) -> String {
    if goals.is_empty() {
        return "No savings goals yet.\n".to_string();
    }

    let rows: Vec<GoalRow> = goals
        .iter()
        .map(|g| GoalRow {
            name: truncate(&g.name, 24),
            saved: g.current_amount.to_string(),
            target: g.target_amount.to_string(),
            progress: format!(
                "{} {:>5.1}%",
                progress_bar(g.progress_percent(), 10),
                g.progress_percent()
            ),
            deadline: deadline_text(g, today),
        })
        .collect();

    render_table(rows, &[1, 2])
}

/// One goal with its pace and recent goal-linked transactions
pub fn format_goal_details(goal: &Goal, history: &[Transaction], today: NaiveDate) -> String {
    let mut output = String::new();

    output.push_str(&format!("Goal: {}\n", goal.name));
    output.push_str(&format!("  ID:          {}\n", goal.id));
    output.push_str(&format!("  Saved:       {}\n", goal.current_amount));
    output.push_str(&format!("  Target:      {}\n", goal.target_amount));
    output.push_str(&format!(
        "  Progress:    {} {:.1}%\n",
        progress_bar(goal.progress_percent(), 20),
        goal.progress_percent()
    ));
    output.push_str(&format!("  Deadline:    {}\n", deadline_text(goal, today)));
    if !goal.is_completed() {
        output.push_str(&format!("  Remaining:   {}\n", goal.remaining()));
        output.push_str(&format!(
            "  Per month:   {}\n",
            goal.monthly_required(today)
        ));
    }
    if !goal.notes.is_empty() {
        output.push_str(&format!("  Notes:       {}\n", goal.notes));
    }

    if !history.is_empty() {
        output.push_str("\nHistory:\n");
        for txn in history {
            let sign = if txn.is_expense() { "+" } else { "-" };
            output.push_str(&format!(
                "  {}  {}{:<14} {}\n",
                txn.date.format("%Y-%m-%d"),
                sign,
                txn.amount.to_string(),
                txn.description
            ));
        }
    }

    output
}
