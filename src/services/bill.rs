//! Bill service
//!
//! Recurring obligations: creation, payment (which records an expense and
//! advances the due date) and upcoming-bill queries.

use chrono::{Duration, NaiveDate};

use crate::audit::EntityType;
use crate::error::{DompetError, DompetResult};
use crate::models::{
    normalize_category, Bill, BillFrequency, BillId, Money, Transaction, TransactionKind,
    TransactionSource,
};
use crate::storage::Storage;

use super::transaction::{CreateTransactionInput, TransactionService};

/// Service for bills
pub struct BillService<'a> {
    storage: &'a Storage,
}

/// Input for creating a bill
#[derive(Debug, Clone)]
pub struct CreateBillInput {
    pub name: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub frequency: BillFrequency,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateBillInput {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub due_date: Option<NaiveDate>,
    pub frequency: Option<BillFrequency>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

impl<'a> BillService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateBillInput) -> DompetResult<Bill> {
        let name = input.name.trim();
        if self.storage.bills.find_by_name(name)?.is_some() {
            return Err(DompetError::Duplicate {
                entity_type: "Bill",
                identifier: name.to_string(),
            });
        }

        let mut bill = Bill::new(name, input.amount, input.due_date, input.frequency);
        if let Some(category) = input.category {
            if let Some(category) = normalize_category(TransactionKind::Expense, &category) {
                bill.category = category;
            }
        }
        if let Some(notes) = input.notes {
            bill.notes = notes;
        }

        bill.validate()
            .map_err(|e| DompetError::Validation(e.to_string()))?;

        self.storage.bills.upsert(bill.clone())?;
        self.storage.bills.save()?;
        self.storage.log_create(
            EntityType::Bill,
            bill.id.to_string(),
            Some(bill.name.clone()),
            &bill,
        )?;

        Ok(bill)
    }

    pub fn get(&self, id: BillId) -> DompetResult<Option<Bill>> {
        self.storage.bills.get(id)
    }

    /// Find by name (case-insensitive) or ID
    pub fn find(&self, identifier: &str) -> DompetResult<Option<Bill>> {
        if let Some(bill) = self.storage.bills.find_by_name(identifier)? {
            return Ok(Some(bill));
        }
        if let Ok(id) = identifier.parse::<BillId>() {
            return self.storage.bills.get(id);
        }
        self.storage.bills.find_by_short_id(identifier)
    }

    pub fn resolve(&self, identifier: &str) -> DompetResult<Bill> {
        self.find(identifier)?
            .ok_or_else(|| DompetError::bill_not_found(identifier))
    }

    pub fn list(&self, include_inactive: bool) -> DompetResult<Vec<Bill>> {
        if include_inactive {
            self.storage.bills.get_all()
        } else {
            self.storage.bills.get_active()
        }
    }

    pub fn update(&self, id: BillId, input: UpdateBillInput) -> DompetResult<Bill> {
        let before = self
            .storage
            .bills
            .get(id)?
            .ok_or_else(|| DompetError::bill_not_found(id.to_string()))?;

        let mut bill = before.clone();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if let Some(existing) = self.storage.bills.find_by_name(&name)? {
                if existing.id != id {
                    return Err(DompetError::Duplicate {
                        entity_type: "Bill",
                        identifier: name,
                    });
                }
            }
            bill.name = name;
        }
        if let Some(amount) = input.amount {
            bill.amount = amount;
        }
        if let Some(due_date) = input.due_date {
            bill.due_date = due_date;
        }
        if let Some(frequency) = input.frequency {
            bill.frequency = frequency;
        }
        if let Some(category) = input.category {
            bill.category = normalize_category(TransactionKind::Expense, &category)
                .unwrap_or_default();
        }
        if let Some(notes) = input.notes {
            bill.notes = notes;
        }
        if let Some(active) = input.active {
            bill.active = active;
        }
        bill.updated_at = chrono::Utc::now();

        bill.validate()
            .map_err(|e| DompetError::Validation(e.to_string()))?;

        self.storage.bills.upsert(bill.clone())?;
        self.storage.bills.save()?;
        self.storage.log_update(
            EntityType::Bill,
            bill.id.to_string(),
            Some(bill.name.clone()),
            &before,
            &bill,
            None,
        )?;

        Ok(bill)
    }

    /// Delete a bill; its payments stay but lose the link
    pub fn delete(&self, id: BillId) -> DompetResult<Bill> {
        let bill = self
            .storage
            .bills
            .get(id)?
            .ok_or_else(|| DompetError::bill_not_found(id.to_string()))?;

        let linked = self.storage.transactions.get_by_bill(id)?;
        for before in &linked {
            let mut txn = before.clone();
            txn.bill_id = None;
            txn.touch();
            self.storage.transactions.upsert(txn.clone())?;
            self.storage.log_update(
                EntityType::Transaction,
                txn.id.to_string(),
                Some(txn.to_string()),
                before,
                &txn,
                Some(format!("bill_id: {} -> (removed)", id)),
            )?;
        }
        if !linked.is_empty() {
            self.storage.transactions.save()?;
        }

        self.storage.bills.delete(id)?;
        self.storage.bills.save()?;
        self.storage.log_delete(
            EntityType::Bill,
            bill.id.to_string(),
            Some(bill.name.clone()),
            &bill,
        )?;

        Ok(bill)
    }

    /// Pay a bill
    ///
    /// Records an expense for the bill (optionally with a different amount),
    /// then advances the due date or deactivates a one-off bill.
    pub fn pay(
        &self,
        id: BillId,
        paid_on: NaiveDate,
        amount: Option<Money>,
        source: TransactionSource,
    ) -> DompetResult<(Transaction, Bill)> {
        let before = self
            .storage
            .bills
            .get(id)?
            .ok_or_else(|| DompetError::bill_not_found(id.to_string()))?;

        if !before.active {
            return Err(DompetError::Validation(format!(
                "Bill '{}' is not active",
                before.name
            )));
        }

        let mut input = CreateTransactionInput::new(
            TransactionKind::Expense,
            amount.unwrap_or(before.amount),
            before.category.clone(),
            paid_on,
        )
        .description(format!("Bayar {}", before.name))
        .source(source);
        input.bill_id = Some(id);

        let txn = TransactionService::new(self.storage).create(input)?;

        let mut bill = before.clone();
        bill.mark_paid(paid_on);

        self.storage.bills.upsert(bill.clone())?;
        self.storage.bills.save()?;
        self.storage.log_update(
            EntityType::Bill,
            bill.id.to_string(),
            Some(bill.name.clone()),
            &before,
            &bill,
            None,
        )?;

        Ok((txn, bill))
    }

    /// Active bills due on or before `today + days`, overdue ones first
    pub fn upcoming(&self, today: NaiveDate, days: i64) -> DompetResult<Vec<Bill>> {
        let horizon = Duration::try_days(days)
            .and_then(|d| today.checked_add_signed(d))
            .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX });
        let mut bills: Vec<_> = self
            .storage
            .bills
            .get_active()?
            .into_iter()
            .filter(|b| b.due_date <= horizon)
            .collect();
        bills.sort_by(|a, b| {
            let a_overdue = a.due_date < today;
            let b_overdue = b.due_date < today;
            b_overdue
                .cmp(&a_overdue)
                .then(a.due_date.cmp(&b.due_date))
        });
        Ok(bills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::DompetPaths;
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

    fn input(name: &str, due: NaiveDate, frequency: BillFrequency) -> CreateBillInput {
        CreateBillInput {
            name: name.to_string(),
            amount: Money::from_rupiah(300_000),
            due_date: due,
            frequency,
            category: None,
            notes: None,
        }
    }

    #[test]
    fn test_create_defaults_category_and_rejects_duplicate() {
        let (_temp, storage) = create_test_storage();
        let service = BillService::new(&storage);

        let bill = service.create(input("Internet", date(1, 10), BillFrequency::Monthly)).unwrap();
        assert_eq!(bill.category, "Tagihan");

        let dup = service.create(input("internet", date(1, 10), BillFrequency::Monthly));
        assert!(matches!(dup, Err(DompetError::Duplicate { .. })));
    }

    #[test]
    fn test_pay_monthly_advances_due_date() {
        let (_temp, storage) = create_test_storage();
        let service = BillService::new(&storage);
        let bill = service.create(input("Listrik", date(1, 31), BillFrequency::Monthly)).unwrap();

        let (txn, bill) = service
            .pay(bill.id, date(1, 30), None, TransactionSource::Manual)
            .unwrap();

        assert_eq!(txn.bill_id, Some(bill.id));
        assert_eq!(txn.amount, Money::from_rupiah(300_000));
        assert_eq!(txn.category, "Tagihan");
        assert_eq!(bill.due_date, date(2, 28));
        assert_eq!(bill.last_paid, Some(date(1, 30)));
    }

    #[test]
    fn test_pay_once_deactivates() {
        let (_temp, storage) = create_test_storage();
        let service = BillService::new(&storage);
        let bill = service.create(input("Servis Motor", date(3, 1), BillFrequency::Once)).unwrap();

        let (_, bill) = service
            .pay(bill.id, date(3, 1), Some(Money::from_rupiah(275_000)), TransactionSource::Manual)
            .unwrap();
        assert!(!bill.active);
        assert!(service.list(false).unwrap().is_empty());

        let again = service.pay(bill.id, date(3, 2), None, TransactionSource::Manual);
        assert!(again.unwrap_err().is_validation());
    }

    #[test]
    fn test_upcoming_orders_overdue_first() {
        let (_temp, storage) = create_test_storage();
        let service = BillService::new(&storage);
        service.create(input("Air", date(1, 20), BillFrequency::Monthly)).unwrap();
        service.create(input("Internet", date(1, 12), BillFrequency::Monthly)).unwrap();
        service.create(input("Pajak", date(1, 8), BillFrequency::Yearly)).unwrap();
        service.create(input("Asuransi", date(3, 1), BillFrequency::Monthly)).unwrap();

        let upcoming = service.upcoming(date(1, 10), 7).unwrap();
        let names: Vec<_> = upcoming.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Pajak", "Internet"]);
    }

    #[test]
    fn test_upcoming_with_huge_window() {
        let (_temp, storage) = create_test_storage();
        let service = BillService::new(&storage);
        service.create(input("Air", date(1, 20), BillFrequency::Monthly)).unwrap();

        assert_eq!(service.upcoming(date(1, 10), 1_000_000_000).unwrap().len(), 1);
        assert_eq!(service.upcoming(date(1, 10), i64::MAX).unwrap().len(), 1);
        assert!(service.upcoming(date(1, 10), i64::MIN).unwrap().is_empty());
    }

    #[test]
    fn test_delete_unlinks_payments() {
        let (_temp, storage) = create_test_storage();
        let service = BillService::new(&storage);
        let bill = service.create(input("Internet", date(1, 10), BillFrequency::Monthly)).unwrap();
        service.pay(bill.id, date(1, 10), None, TransactionSource::Manual).unwrap();

        service.delete(bill.id).unwrap();
        let txns = storage.transactions.get_all().unwrap();
        assert_eq!(txns.len(), 1);
        assert!(txns[0].bill_id.is_none());
        assert!(service.resolve("Internet").unwrap_err().is_not_found());
    }
}
