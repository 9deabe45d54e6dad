//! CSV Export functionality
//!
//! Exports transactions to a spreadsheet-compatible CSV file.

use crate::error::{DompetError, DompetResult};
use crate::models::Transaction;
use crate::storage::Storage;
use std::io::Write;

pub const TRANSACTION_CSV_HEADER: [&str; 9] = [
    "ID",
    "Date",
    "Type",
    "Category",
    "Description",
    "Amount",
    "Goal",
    "Bill",
    "Source",
];

/// Export all transactions to CSV, newest first
///
/// Goal and bill columns carry names when the linked entity still exists,
/// otherwise the raw ID.
pub fn export_transactions_csv<W: Write>(storage: &Storage, writer: W) -> DompetResult<usize> {
    let transactions = storage.transactions.get_all()?;
    let goals = storage.goals.get_all()?;
    let bills = storage.bills.get_all()?;

    write_rows(
        &transactions,
        writer,
        |txn| {
            txn.goal_id
                .and_then(|id| goals.iter().find(|g| g.id == id))
                .map(|g| g.name.clone())
        },
        |txn| {
            txn.bill_id
                .and_then(|id| bills.iter().find(|b| b.id == id))
                .map(|b| b.name.clone())
        },
    )?;
    Ok(transactions.len())
}

fn write_rows<W, G, B>(
    transactions: &[Transaction],
    writer: W,
    goal_name: G,
    bill_name: B,
) -> DompetResult<()>
where
    W: Write,
    G: Fn(&Transaction) -> Option<String>,
    B: Fn(&Transaction) -> Option<String>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TRANSACTION_CSV_HEADER)?;

    for txn in transactions {
        let goal = goal_name(txn)
            .or_else(|| txn.goal_id.map(|id| id.to_string()))
            .unwrap_or_default();
        let bill = bill_name(txn)
            .or_else(|| txn.bill_id.map(|id| id.to_string()))
            .unwrap_or_default();

        csv_writer.write_record([
            txn.id.as_uuid().to_string(),
            txn.date.to_string(),
            txn.kind.to_string(),
            txn.category.clone(),
            txn.description.clone(),
            format!("{:.2}", txn.amount.as_major_f64()),
            goal,
            bill,
            txn.source.to_string(),
        ])?;
    }

    csv_writer
        .flush()
        .map_err(|e| DompetError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::DompetPaths;
    use crate::models::{Goal, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_export_transactions_csv() {
        let (_temp_dir, storage) = create_test_storage();

        let txn = Transaction::expense(
            Money::from_rupiah(45_000),
            "Makanan & Minuman",
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        )
        .with_description("Nasi goreng, es teh");
        storage.transactions.upsert(txn.clone()).unwrap();

        let mut output = Vec::new();
        let count = export_transactions_csv(&storage, &mut output).unwrap();
        assert_eq!(count, 1);

        let csv_string = String::from_utf8(output).unwrap();
        let mut lines = csv_string.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID,Date,Type,Category,Description,Amount,Goal,Bill,Source"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with(&txn.id.as_uuid().to_string()));
        assert!(row.contains("2025-01-15,expense,Makanan & Minuman,\"Nasi goreng, es teh\",45000.00,,,manual"));
    }

    #[test]
    fn test_export_resolves_goal_name() {
        let (_temp_dir, storage) = create_test_storage();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let goal = Goal::new("Dana Darurat", Money::from_rupiah(5_000_000), date);
        storage.goals.upsert(goal.clone()).unwrap();

        let mut txn = Transaction::expense(Money::from_rupiah(100_000), "Tabungan", date);
        txn.goal_id = Some(goal.id);
        storage.transactions.upsert(txn).unwrap();

        let mut output = Vec::new();
        export_transactions_csv(&storage, &mut output).unwrap();
        let csv_string = String::from_utf8(output).unwrap();
        assert!(csv_string.contains(",Dana Darurat,,manual"));
    }
}
