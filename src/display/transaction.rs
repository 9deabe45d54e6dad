//! Transaction display formatting

use tabled::Tabled;

use crate::models::{Money, Transaction, TransactionKind};

use super::{render_table, truncate};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn signed(txn: &Transaction) -> String {
    match txn.kind {
        TransactionKind::Income => format!("+{}", txn.amount),
        TransactionKind::Expense => format!("-{}", txn.amount),
    }
}

/// Transactions as a table with income and expense totals
pub fn format_transaction_table(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows: Vec<TransactionRow> = transactions
        .iter()
        .map(|txn| {
            let mut description = truncate(&txn.description, 32);
            if txn.goal_id.is_some() {
                description.push_str(" [goal]");
            } else if txn.bill_id.is_some() {
                description.push_str(" [bill]");
            }
            TransactionRow {
                id: txn.id.to_string(),
                date: txn.date.format("%Y-%m-%d").to_string(),
                category: truncate(&txn.category, 20),
                description,
                amount: signed(txn),
            }
        })
        .collect();

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

    let mut output = render_table(rows, &[4]);
    output.push('\n');
    output.push_str(&format!(
        "{} transaction(s)  Income: {}  Expense: {}  Net: {}\n",
        transactions.len(),
        income,
        expense,
        income - expense
    ));
    output
}

/// Full details of one transaction
///
/// `goal_name` and `bill_name` are the names of linked entities when known.
pub fn format_transaction_details(
    txn: &Transaction,
    goal_name: Option<&str>,
    bill_name: Option<&str>,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("  Type:        {}\n", txn.kind.label()));
    output.push_str(&format!("  Date:        {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!("  Amount:      {}\n", txn.amount));
    output.push_str(&format!("  Category:    {}\n", txn.category));
    if !txn.description.is_empty() {
        output.push_str(&format!("  Description: {}\n", txn.description));
    }
    if let Some(goal_id) = txn.goal_id {
        output.push_str(&format!(
            "  Goal:        {}\n",
            goal_name.map(str::to_string).unwrap_or_else(|| goal_id.to_string())
        ));
    }
    if let Some(bill_id) = txn.bill_id {
        output.push_str(&format!(
            "  Bill:        {}\n",
            bill_name.map(str::to_string).unwrap_or_else(|| bill_id.to_string())
        ));
    }
    output.push_str(&format!("  Source:      {}\n", txn.source));
    output.push_str(&format!(
        "  Created:     {}\n",
        txn.created_at.format("%Y-%m-%d %H:%M")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_table_shows_signed_amounts_and_totals() {
        let transactions = vec![
            Transaction::income(Money::from_rupiah(5_000_000), "Gaji", date(1)),
            Transaction::expense(Money::from_rupiah(35_000), "Makanan & Minuman", date(2))
                .with_description("Makan siang"),
        ];

        let table = format_transaction_table(&transactions);
        assert!(table.contains("+Rp5.000.000"));
        assert!(table.contains("-Rp35.000"));
        assert!(table.contains("Makan siang"));
        assert!(table.contains("Net: Rp4.965.000"));
    }

    #[test]
    fn test_empty_table() {
        assert!(format_transaction_table(&[]).contains("No transactions found"));
    }

    #[test]
    fn test_details() {
        let txn = Transaction::expense(Money::from_rupiah(20_000), "Transportasi", date(3))
            .with_description("Ojek");
        let details = format_transaction_details(&txn, None, None);
        assert!(details.contains("Pengeluaran"));
        assert!(details.contains("Ojek"));
        assert!(!details.contains("Goal:"));
    }
}
