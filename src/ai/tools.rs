//! Tools the chat assistant can call
//!
//! Each tool has a parameter struct whose JSON schema is offered to the
//! model. Calls are executed against the services; any failure is returned
//! to the model as `{"error": "..."}` so it can correct itself.

use chrono::NaiveDate;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::settings::Settings;
use crate::error::{DompetError, DompetResult};
use crate::models::{
    normalize_category, Bill, BillFrequency, Budget, BudgetStatus, Goal, Money, Month, Transaction,
    TransactionKind, TransactionSource,
};
use crate::services::{
    BillService, BudgetService, CreateBillInput, CreateTransactionInput, GoalService,
    SummaryService, TransactionFilter, TransactionService,
};
use crate::storage::Storage;

use super::types::{FunctionCall, ToolDeclaration};

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 100;
const DEFAULT_BILL_DAYS: i64 = 30;
const MAX_BILL_DAYS: i64 = 366;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Income => TransactionKind::Income,
            KindArg::Expense => TransactionKind::Expense,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddTransactionParams {
    /// "income" or "expense"
    #[serde(rename = "type")]
    pub kind: KindArg,
    /// Amount in Rupiah
    pub amount: f64,
    /// Category name, e.g. "Makanan & Minuman"
    pub category: String,
    pub description: Option<String>,
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetTransactionsParams {
    #[serde(rename = "type")]
    pub kind: Option<KindArg>,
    pub category: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub start_date: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub end_date: Option<String>,
    /// Text to look for in description or category
    pub search: Option<String>,
    /// Maximum number of transactions, default 20
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteTransactionParams {
    /// Transaction ID as returned by get_transactions
    pub id: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct MonthParams {
    /// YYYY-MM, defaults to the current month
    pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetBudgetStatusParams {
    /// YYYY-MM, defaults to the current month
    pub month: Option<String>,
    /// Only this category
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetBudgetParams {
    pub category: String,
    /// Monthly limit in Rupiah
    pub amount: f64,
    /// YYYY-MM, defaults to the current month
    pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetGoalsParams {
    /// Also list completed goals
    pub include_completed: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddGoalParams {
    pub name: String,
    /// Target in Rupiah
    pub target_amount: f64,
    /// YYYY-MM-DD
    pub target_date: String,
    /// Amount already saved, in Rupiah
    pub initial_amount: Option<f64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ContributeToGoalParams {
    /// Goal name or ID
    pub goal: String,
    /// Amount in Rupiah
    pub amount: f64,
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetBillsParams {
    /// Only bills due within this many days, default 30
    pub days: Option<i64>,
    /// List every bill regardless of due date, including inactive ones
    pub all: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddBillParams {
    pub name: String,
    /// Amount in Rupiah
    pub amount: f64,
    /// Next due date, YYYY-MM-DD
    pub due_date: String,
    /// once, weekly, monthly or yearly; defaults to monthly
    pub frequency: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PayBillParams {
    /// Bill name or ID
    pub bill: String,
    /// Amount actually paid, defaults to the bill amount
    pub amount: Option<f64>,
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

/// Result of one tool call
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutcome {
    pub name: String,
    pub response: Value,
    /// Whether the call changed stored data
    pub mutated: bool,
}

impl ToolOutcome {
    pub fn is_error(&self) -> bool {
        self.response.get("error").is_some()
    }
}

/// JSON schema of a parameter struct in the subset Gemini accepts
pub fn parameters_schema<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::openapi3().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let mut value = serde_json::to_value(root).unwrap_or_else(|_| json!({ "type": "object" }));
    strip_unsupported(&mut value);
    value
}

fn strip_unsupported(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["title", "$schema", "format", "minimum", "definitions"] {
                map.remove(key);
            }
            for child in map.values_mut() {
                strip_unsupported(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_unsupported),
        _ => {}
    }
}

fn declaration<T: JsonSchema>(name: &str, description: &str) -> ToolDeclaration {
    ToolDeclaration {
        name: name.to_string(),
        description: description.to_string(),
        parameters: parameters_schema::<T>(),
    }
}

/// Runs tool calls against the data store
pub struct ToolExecutor<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
    today: NaiveDate,
}

impl<'a> ToolExecutor<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings, today: NaiveDate) -> Self {
        Self {
            storage,
            settings,
            today,
        }
    }

    pub fn declarations() -> Vec<ToolDeclaration> {
        vec![
            declaration::<AddTransactionParams>(
                "add_transaction",
                "Catat transaksi pemasukan atau pengeluaran baru",
            ),
            declaration::<GetTransactionsParams>(
                "get_transactions",
                "Ambil daftar transaksi, terbaru dulu, dengan filter opsional",
            ),
            declaration::<DeleteTransactionParams>(
                "delete_transaction",
                "Hapus transaksi berdasarkan ID",
            ),
            declaration::<MonthParams>(
                "get_financial_summary",
                "Ringkasan pemasukan, pengeluaran, saldo dan kategori teratas satu bulan",
            ),
            declaration::<GetBudgetStatusParams>(
                "get_budget_status",
                "Status anggaran per kategori: terpakai, sisa dan persentase",
            ),
            declaration::<SetBudgetParams>(
                "set_budget",
                "Buat atau ubah anggaran bulanan untuk satu kategori",
            ),
            declaration::<GetGoalsParams>("get_goals", "Daftar target tabungan dan progresnya"),
            declaration::<AddGoalParams>("add_goal", "Buat target tabungan baru"),
            declaration::<ContributeToGoalParams>(
                "contribute_to_goal",
                "Tambah setoran ke target tabungan",
            ),
            declaration::<GetBillsParams>(
                "get_bills",
                "Daftar tagihan yang akan jatuh tempo atau terlambat",
            ),
            declaration::<AddBillParams>("add_bill", "Tambah tagihan rutin atau sekali bayar"),
            declaration::<PayBillParams>(
                "pay_bill",
                "Bayar tagihan: catat pengeluaran dan majukan jatuh tempo",
            ),
        ]
    }

    /// Execute one call; never fails, errors go into the response
    pub fn execute(&self, call: &FunctionCall) -> ToolOutcome {
        debug!(tool = %call.name, args = %call.args, "executing tool");

        let args = if call.args.is_null() {
            json!({})
        } else {
            call.args.clone()
        };

        let result = match call.name.as_str() {
            "add_transaction" => parse(args).and_then(|p| self.add_transaction(p)).map(changed),
            "get_transactions" => parse(args).and_then(|p| self.get_transactions(p)).map(read),
            "delete_transaction" => parse(args)
                .and_then(|p| self.delete_transaction(p))
                .map(changed),
            "get_financial_summary" => parse(args).and_then(|p| self.summary(p)).map(read),
            "get_budget_status" => parse(args).and_then(|p| self.budget_status(p)).map(read),
            "set_budget" => parse(args).and_then(|p| self.set_budget(p)).map(changed),
            "get_goals" => parse(args).and_then(|p| self.get_goals(p)).map(read),
            "add_goal" => parse(args).and_then(|p| self.add_goal(p)).map(changed),
            "contribute_to_goal" => parse(args).and_then(|p| self.contribute(p)).map(changed),
            "get_bills" => parse(args).and_then(|p| self.get_bills(p)).map(read),
            "add_bill" => parse(args).and_then(|p| self.add_bill(p)).map(changed),
            "pay_bill" => parse(args).and_then(|p| self.pay_bill(p)).map(changed),
            other => Err(DompetError::Validation(format!("Unknown tool '{}'", other))),
        };

        match result {
            Ok((response, mutated)) => ToolOutcome {
                name: call.name.clone(),
                response,
                mutated,
            },
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                ToolOutcome {
                    name: call.name.clone(),
                    response: json!({ "error": e.to_string() }),
                    mutated: false,
                }
            }
        }
    }

    fn money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.settings.currency_symbol)
    }

    fn month_or_current(&self, month: Option<&str>) -> DompetResult<Month> {
        match month {
            Some(m) => Month::parse(m).map_err(DompetError::Validation),
            None => Ok(Month::containing(self.today)),
        }
    }

    fn date_or_today(&self, date: Option<&str>) -> DompetResult<NaiveDate> {
        match date {
            Some(d) => parse_date(d),
            None => Ok(self.today),
        }
    }

    fn add_transaction(&self, p: AddTransactionParams) -> DompetResult<Value> {
        let kind = TransactionKind::from(p.kind);
        let category = normalize_category(kind, &p.category)
            .ok_or_else(|| DompetError::Validation("Category is required".to_string()))?;

        let mut input = CreateTransactionInput::new(
            kind,
            amount(p.amount)?,
            category,
            self.date_or_today(p.date.as_deref())?,
        )
        .source(TransactionSource::Chat);
        if let Some(description) = p.description {
            input = input.description(description);
        }

        let txn = TransactionService::new(self.storage).create(input)?;
        Ok(json!({ "created": self.transaction_json(&txn) }))
    }

    fn get_transactions(&self, p: GetTransactionsParams) -> DompetResult<Value> {
        let mut filter = TransactionFilter::new().limit(
            p.limit
                .map(|l| l as usize)
                .unwrap_or(DEFAULT_LIST_LIMIT)
                .clamp(1, MAX_LIST_LIMIT),
        );
        if let Some(kind) = p.kind {
            filter = filter.kind(kind.into());
        }
        if let Some(category) = p.category {
            filter = filter.category(category);
        }
        if let Some(search) = p.search {
            filter = filter.search(search);
        }
        if p.start_date.is_some() || p.end_date.is_some() {
            let start = match p.start_date.as_deref() {
                Some(d) => parse_date(d)?,
                None => NaiveDate::MIN,
            };
            let end = match p.end_date.as_deref() {
                Some(d) => parse_date(d)?,
                None => NaiveDate::MAX,
            };
            filter = filter.date_range(start, end);
        }

        let transactions = TransactionService::new(self.storage).list(filter)?;
        Ok(json!({
            "count": transactions.len(),
            "transactions": transactions.iter().map(|t| self.transaction_json(t)).collect::<Vec<_>>(),
        }))
    }

    fn delete_transaction(&self, p: DeleteTransactionParams) -> DompetResult<Value> {
        let service = TransactionService::new(self.storage);
        let txn = service
            .find(&p.id)?
            .ok_or_else(|| DompetError::transaction_not_found(&p.id))?;
        let deleted = service.delete(txn.id)?;
        Ok(json!({ "deleted": self.transaction_json(&deleted) }))
    }

    fn summary(&self, p: MonthParams) -> DompetResult<Value> {
        let month = self.month_or_current(p.month.as_deref())?;
        let summary = SummaryService::new(
            self.storage,
            self.settings.notifications.budget_warning_percent,
        )
        .month_summary(month, self.today)?;

        Ok(json!({
            "month": month.to_string(),
            "income": self.money(summary.income),
            "expense": self.money(summary.expense),
            "balance": self.money(summary.balance),
            "savings_rate_percent": round1(summary.savings_rate),
            "transaction_count": summary.transaction_count,
            "top_expense_categories": summary.top_categories.iter().map(|c| json!({
                "category": c.category,
                "amount": self.money(c.amount),
                "percent": round1(c.percent),
            })).collect::<Vec<_>>(),
            "budgets": summary.budgets,
            "upcoming_bills": summary.upcoming_bills.iter().map(|b| self.bill_json(b)).collect::<Vec<_>>(),
        }))
    }

    fn budget_status(&self, p: GetBudgetStatusParams) -> DompetResult<Value> {
        let month = self.month_or_current(p.month.as_deref())?;
        let service = BudgetService::new(
            self.storage,
            self.settings.notifications.budget_warning_percent,
        );
        let statuses: Vec<BudgetStatus> = match p.category.as_deref() {
            Some(category) => service.status_for(category, month)?.into_iter().collect(),
            None => service.status(month)?,
        };

        Ok(json!({
            "month": month.to_string(),
            "budgets": statuses.iter().map(|s| self.budget_status_json(s)).collect::<Vec<_>>(),
        }))
    }

    fn set_budget(&self, p: SetBudgetParams) -> DompetResult<Value> {
        let month = self.month_or_current(p.month.as_deref())?;
        let budget = BudgetService::new(
            self.storage,
            self.settings.notifications.budget_warning_percent,
        )
        .set(&p.category, month, amount(p.amount)?)?;
        Ok(json!({ "budget": self.budget_json(&budget) }))
    }

    fn get_goals(&self, p: GetGoalsParams) -> DompetResult<Value> {
        let goals = GoalService::new(self.storage).list(p.include_completed.unwrap_or(false))?;
        Ok(json!({
            "goals": goals.iter().map(|g| self.goal_json(g)).collect::<Vec<_>>(),
        }))
    }

    fn add_goal(&self, p: AddGoalParams) -> DompetResult<Value> {
        let initial = p.initial_amount.map(amount).transpose()?;
        let goal = GoalService::new(self.storage).create(
            &p.name,
            amount(p.target_amount)?,
            parse_date(&p.target_date)?,
            initial,
            self.today,
        )?;
        Ok(json!({ "goal": self.goal_json(&goal) }))
    }

    fn contribute(&self, p: ContributeToGoalParams) -> DompetResult<Value> {
        let service = GoalService::new(self.storage);
        let goal = service.resolve(&p.goal)?;
        let (txn, goal) = service.contribute(
            goal.id,
            amount(p.amount)?,
            self.date_or_today(p.date.as_deref())?,
            TransactionSource::Chat,
        )?;
        Ok(json!({
            "transaction": self.transaction_json(&txn),
            "goal": self.goal_json(&goal),
        }))
    }

    fn get_bills(&self, p: GetBillsParams) -> DompetResult<Value> {
        let service = BillService::new(self.storage);
        let bills = if p.all.unwrap_or(false) {
            service.list(true)?
        } else {
            service.upcoming(
                self.today,
                p.days.unwrap_or(DEFAULT_BILL_DAYS).clamp(0, MAX_BILL_DAYS),
            )?
        };
        Ok(json!({
            "bills": bills.iter().map(|b| self.bill_json(b)).collect::<Vec<_>>(),
        }))
    }

    fn add_bill(&self, p: AddBillParams) -> DompetResult<Value> {
        let frequency = match p.frequency.as_deref() {
            Some(f) => f.parse::<BillFrequency>().map_err(DompetError::Validation)?,
            None => BillFrequency::default(),
        };
        let bill = BillService::new(self.storage).create(CreateBillInput {
            name: p.name,
            amount: amount(p.amount)?,
            due_date: parse_date(&p.due_date)?,
            frequency,
            category: p
                .category
                .and_then(|c| normalize_category(TransactionKind::Expense, &c)),
            notes: None,
        })?;
        Ok(json!({ "bill": self.bill_json(&bill) }))
    }

    fn pay_bill(&self, p: PayBillParams) -> DompetResult<Value> {
        let service = BillService::new(self.storage);
        let bill = service.resolve(&p.bill)?;
        let paid_amount = p.amount.map(amount).transpose()?;
        let (txn, bill) = service.pay(
            bill.id,
            self.date_or_today(p.date.as_deref())?,
            paid_amount,
            TransactionSource::Chat,
        )?;
        Ok(json!({
            "transaction": self.transaction_json(&txn),
            "bill": self.bill_json(&bill),
        }))
    }

    fn transaction_json(&self, txn: &Transaction) -> Value {
        json!({
            "id": txn.id.to_string(),
            "type": txn.kind.to_string(),
            "amount": self.money(txn.amount),
            "category": txn.category,
            "description": txn.description,
            "date": txn.date.to_string(),
        })
    }

    fn budget_json(&self, budget: &Budget) -> Value {
        json!({
            "category": budget.category,
            "month": budget.month.to_string(),
            "amount": self.money(budget.amount),
        })
    }

    fn budget_status_json(&self, status: &BudgetStatus) -> Value {
        json!({
            "category": status.budget.category,
            "limit": self.money(status.budget.amount),
            "spent": self.money(status.spent),
            "remaining": self.money(status.remaining),
            "percent_used": round1(status.percent_used),
            "status": status.state.to_string(),
        })
    }

    fn goal_json(&self, goal: &Goal) -> Value {
        json!({
            "id": goal.id.to_string(),
            "name": goal.name,
            "current": self.money(goal.current_amount),
            "target": self.money(goal.target_amount),
            "remaining": self.money(goal.remaining()),
            "percent": round1(goal.progress_percent()),
            "target_date": goal.target_date.to_string(),
            "days_left": goal.days_left(self.today),
            "completed": goal.is_completed(),
        })
    }

    fn bill_json(&self, bill: &Bill) -> Value {
        json!({
            "id": bill.id.to_string(),
            "name": bill.name,
            "amount": self.money(bill.amount),
            "category": bill.category,
            "due_date": bill.due_date.to_string(),
            "days_until_due": bill.days_until_due(self.today),
            "frequency": bill.frequency.to_string(),
            "active": bill.active,
        })
    }
}

fn parse<T: DeserializeOwned>(args: Value) -> DompetResult<T> {
    serde_json::from_value(args)
        .map_err(|e| DompetError::Validation(format!("Invalid arguments: {}", e)))
}

fn changed(response: Value) -> (Value, bool) {
    (response, true)
}

fn read(response: Value) -> (Value, bool) {
    (response, false)
}

fn amount(value: f64) -> DompetResult<Money> {
    let money = Money::from_major_f64(value).ok_or_else(|| {
        DompetError::Validation(format!("Amount out of range: {} (max {})", value, Money::MAX))
    })?;
    if !money.is_positive() {
        return Err(DompetError::Validation(format!(
            "Amount must be positive, got {}",
            value
        )));
    }
    Ok(money)
}

fn parse_date(s: &str) -> DompetResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| DompetError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", s)))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
