//! Bill display formatting

use chrono::NaiveDate;
use tabled::Tabled;

use crate::models::Bill;

use super::{render_table, truncate};

#[derive(Tabled)]
struct BillRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Repeats")]
    frequency: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn due_text(bill: &Bill, today: NaiveDate) -> String {
    if !bill.active {
        return "-".to_string();
    }
    match bill.days_until_due(today) {
        0 => format!("{} (today)", bill.due_date),
        d if d < 0 => format!("{} ({}d late)", bill.due_date, -d),
        d => format!("{} (in {}d)", bill.due_date, d),
    }
}

pub fn format_bill_table(bills: &[Bill], today: NaiveDate, reminder_days: i64) -> String {
    if bills.is_empty() {
        return "No bills found.\n".to_string();
    }

    let rows: Vec<BillRow> = bills
        .iter()
        .map(|b| BillRow {
            name: truncate(&b.name, 24),
            amount: b.amount.to_string(),
            due: due_text(b, today),
            frequency: b.frequency.to_string(),
            status: b.status(today, reminder_days).to_string(),
        })
        .collect();

    render_table(rows, &[1])
}

pub fn format_bill_details(bill: &Bill, today: NaiveDate, reminder_days: i64) -> String {
    let mut output = String::new();
    output.push_str(&format!("Bill: {}\n", bill.name));
    output.push_str(&format!("  ID:        {}\n", bill.id));
    output.push_str(&format!("  Amount:    {}\n", bill.amount));
    output.push_str(&format!("  Category:  {}\n", bill.category));
    output.push_str(&format!("  Repeats:   {}\n", bill.frequency));
    output.push_str(&format!("  Due:       {}\n", due_text(bill, today)));
    output.push_str(&format!(
        "  Status:    {}\n",
        bill.status(today, reminder_days)
    ));
    if let Some(paid) = bill.last_paid {
        output.push_str(&format!("  Last paid: {}\n", paid));
    }
    if !bill.notes.is_empty() {
        output.push_str(&format!("  Notes:     {}\n", bill.notes));
    }
    output
}
