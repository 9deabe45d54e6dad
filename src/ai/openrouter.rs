//! OpenRouter client for free-text parsing and receipt OCR
//!
//! Uses the OpenAI-compatible chat completions API. The model is asked for a
//! single JSON object; the reply is searched for the first JSON object since
//! models like to wrap it in markdown fences or prose.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{DompetError, DompetResult};
use crate::models::{
    normalize_category, Money, TransactionKind, TransactionSource, EXPENSE_CATEGORIES,
    INCOME_CATEGORIES,
};
use crate::services::CreateTransactionInput;

use super::{http_client, read_response};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai";

/// Category used when a receipt does not suggest one
const RECEIPT_FALLBACK_CATEGORY: &str = "Belanja";

/// Category used when parsed text does not suggest one
const TEXT_FALLBACK_CATEGORY: &str = "Lainnya";

/// A transaction extracted from a free-text description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTransaction {
    pub kind: TransactionKind,
    pub amount: Money,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

impl ParsedTransaction {
    pub fn to_input(&self) -> CreateTransactionInput {
        CreateTransactionInput::new(self.kind, self.amount, self.category.clone(), self.date)
            .description(self.description.clone())
            .source(TransactionSource::Text)
    }
}

/// One line of a receipt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: f64,
    pub price: Money,
}

/// What could be read from a receipt photo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptData {
    pub merchant: Option<String>,
    pub date: Option<NaiveDate>,
    pub total: Money,
    pub items: Vec<ReceiptItem>,
    pub category: String,
}

impl ReceiptData {
    /// An expense for the receipt total, dated on the receipt or `today`
    pub fn to_input(&self, today: NaiveDate) -> CreateTransactionInput {
        let description = match &self.merchant {
            Some(merchant) => format!("Belanja di {}", merchant),
            None => "Struk belanja".to_string(),
        };
        CreateTransactionInput::new(
            TransactionKind::Expense,
            self.total,
            self.category.clone(),
            self.date.unwrap_or(today),
        )
        .description(description)
        .source(TransactionSource::Receipt)
    }
}

pub struct OpenRouterClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> DompetResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DompetError::Config(
                "OPENROUTER_API_KEY is not set".to_string(),
            ));
        }

        Ok(Self {
            http: http_client(timeout_secs)?,
            base_url: OPENROUTER_BASE_URL.to_string(),
            api_key,
            model: model.into(),
        })
    }

    /// Point the client at another host, e.g. a proxy
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Turn "makan siang 35rb kemarin" into a transaction
    pub fn parse_transaction_text(
        &self,
        text: &str,
        today: NaiveDate,
    ) -> DompetResult<ParsedTransaction> {
        let messages = vec![
            json!({ "role": "system", "content": text_parsing_prompt(today) }),
            json!({ "role": "user", "content": text }),
        ];
        let content = self.complete(messages)?;
        let value = extract_json_object(&content).ok_or_else(|| {
            DompetError::Ai(format!("No JSON object in model reply: {}", content.trim()))
        })?;
        interpret_transaction(&value, today)
    }

    /// Read a receipt photo
    pub fn scan_receipt(&self, image: &[u8], mime: &str) -> DompetResult<ReceiptData> {
        let messages = vec![
            json!({ "role": "system", "content": receipt_prompt() }),
            json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": "Baca struk ini." },
                    { "type": "image_url", "image_url": { "url": image_data_url(image, mime) } }
                ]
            }),
        ];
        let content = self.complete(messages)?;
        let value = extract_json_object(&content).ok_or_else(|| {
            DompetError::Ai(format!("No JSON object in model reply: {}", content.trim()))
        })?;
        interpret_receipt(&value)
    }

    fn complete(&self, messages: Vec<Value>) -> DompetResult<String> {
        debug!(model = %self.model, "openrouter chat completion");
        let response = self
            .http
            .post(format!("{}/api/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&build_chat_body(&self.model, messages))
            .send()?;

        extract_message_content(&read_response(response)?)
    }
}

pub fn build_chat_body(model: &str, messages: Vec<Value>) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "temperature": 0.1,
    })
}

/// `choices[0].message.content` of a chat completion
pub fn extract_message_content(body: &Value) -> DompetResult<String> {
    if let Some(message) = body.pointer("/error/message").and_then(Value::as_str) {
        return Err(DompetError::Ai(message.to_string()));
    }

    let content = body
        .pointer("/choices/0/message/content")
        .ok_or_else(|| DompetError::Ai("Completion has no choices".to_string()))?;

    match content {
        Value::String(text) => Ok(text.clone()),
        // Some providers return content as a list of typed parts
        Value::Array(parts) => Ok(parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("")),
        _ => Err(DompetError::Ai("Completion content is empty".to_string())),
    }
}

/// Base64 data URL for an image
pub fn image_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// MIME type from an image file extension
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Find and parse the first balanced JSON object in `text`
pub fn extract_json_object(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, &b) in bytes.iter().enumerate().skip(start) {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        if let Ok(value) = serde_json::from_str::<Value>(&text[start..=i]) {
                            if value.is_object() {
                                return Some(value);
                            }
                        }
                        break;
                    }
                }
                _ => {}
            }
        }

        search_from = start + 1;
    }

    None
}

/// Amount from a JSON number or an Indonesian-formatted string
///
/// Strings accept `Rp` prefixes, `1.250.000`, and the shorthands `rb`/`ribu`/`k`
/// and `jt`/`juta`.
pub fn parse_amount(value: &Value) -> Option<Money> {
    match value {
        Value::Number(n) => n.as_f64().and_then(Money::from_major_f64),
        Value::String(s) => parse_amount_text(s),
        _ => None,
    }
}

fn parse_amount_text(raw: &str) -> Option<Money> {
    let lowered = raw.trim().to_lowercase();
    let multipliers: [(&str, i64); 5] = [
        ("juta", 1_000_000),
        ("jt", 1_000_000),
        ("ribu", 1_000),
        ("rb", 1_000),
        ("k", 1_000),
    ];

    for (suffix, factor) in multipliers {
        if let Some(number) = lowered.strip_suffix(suffix) {
            let number = number.trim().trim_start_matches("rp").trim();
            // "1,5jt" and "1.5jt" both mean one and a half million
            let base: f64 = number.replace(',', ".").parse().ok()?;
            return Money::from_major_f64(base * factor as f64);
        }
    }

    Money::parse(&lowered).ok()
}

fn parse_date(value: Option<&Value>) -> Option<NaiveDate> {
    let text = value?.as_str()?.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(text, "%d-%m-%Y"))
        .ok()
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build a transaction from the model's JSON
pub fn interpret_transaction(value: &Value, today: NaiveDate) -> DompetResult<ParsedTransaction> {
    let kind = string_field(value, "type")
        .or_else(|| string_field(value, "kind"))
        .and_then(|k| k.parse::<TransactionKind>().ok())
        .unwrap_or(TransactionKind::Expense);

    let amount = value
        .get("amount")
        .and_then(parse_amount)
        .filter(|a| a.is_positive())
        .ok_or_else(|| DompetError::Ai("Could not read an amount from the text".to_string()))?;

    let category = string_field(value, "category")
        .and_then(|c| normalize_category(kind, &c))
        .unwrap_or_else(|| TEXT_FALLBACK_CATEGORY.to_string());

    Ok(ParsedTransaction {
        kind,
        amount,
        category,
        description: string_field(value, "description").unwrap_or_default(),
        date: parse_date(value.get("date")).unwrap_or(today),
    })
}

/// Build receipt data from the model's JSON
pub fn interpret_receipt(value: &Value) -> DompetResult<ReceiptData> {
    let items: Vec<ReceiptItem> = value
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(ReceiptItem {
                        name: string_field(item, "name")?,
                        quantity: item.get("quantity").and_then(Value::as_f64).unwrap_or(1.0),
                        price: item.get("price").and_then(parse_amount)?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let total = value
        .get("total")
        .and_then(parse_amount)
        .filter(|t| t.is_positive())
        .or_else(|| {
            let sum: Money = items.iter().map(|i| i.price).sum();
            Some(sum).filter(|s| s.is_positive())
        })
        .ok_or_else(|| DompetError::Ai("Could not read a total from the receipt".to_string()))?;

    let category = string_field(value, "category")
        .and_then(|c| normalize_category(TransactionKind::Expense, &c))
        .unwrap_or_else(|| RECEIPT_FALLBACK_CATEGORY.to_string());

    Ok(ReceiptData {
        merchant: string_field(value, "merchant"),
        date: parse_date(value.get("date")),
        total,
        items,
        category,
    })
}

fn text_parsing_prompt(today: NaiveDate) -> String {
    format!(
        "Kamu mengubah deskripsi transaksi berbahasa Indonesia menjadi JSON.\n\
         Hari ini {today}. Jawab HANYA dengan satu objek JSON:\n\
         {{\"type\": \"income\"|\"expense\", \"amount\": angka dalam Rupiah, \
         \"category\": kategori, \"description\": teks singkat, \"date\": \"YYYY-MM-DD\"}}\n\
         Kategori pengeluaran: {expense}.\nKategori pemasukan: {income}.\n\
         \"25rb\" berarti 25000, \"1,5jt\" berarti 1500000. \
         \"kemarin\" berarti satu hari sebelum hari ini.",
        today = today.format("%Y-%m-%d"),
        expense = EXPENSE_CATEGORIES.join(", "),
        income = INCOME_CATEGORIES.join(", "),
    )
}

fn receipt_prompt() -> String {
    format!(
        "Kamu membaca foto struk belanja. Jawab HANYA dengan satu objek JSON:\n\
         {{\"merchant\": nama toko atau null, \"date\": \"YYYY-MM-DD\" atau null, \
         \"total\": angka dalam Rupiah, \
         \"items\": [{{\"name\": teks, \"quantity\": angka, \"price\": angka}}], \
         \"category\": salah satu dari {}}}\n\
         Jangan mengarang angka yang tidak terbaca.",
        EXPENSE_CATEGORIES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_extract_json_object_from_fenced_reply() {
        let reply = "Berikut hasilnya:\n```json\n{\"amount\": 25000, \"note\": \"pakai {kurung}\"}\n```";
        let value = extract_json_object(reply).unwrap();
        assert_eq!(value["amount"], 25000);
        assert_eq!(value["note"], "pakai {kurung}");
    }

    #[test]
    fn test_extract_json_object_skips_invalid_braces() {
        assert_eq!(
            extract_json_object("{bukan json} lalu {\"ok\": true}").unwrap()["ok"],
            true
        );
        assert!(extract_json_object("tidak ada objek").is_none());
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount(&json!(25000)), Some(Money::from_rupiah(25_000)));
        assert_eq!(parse_amount(&json!("Rp 1.250.000")), Some(Money::from_rupiah(1_250_000)));
        assert_eq!(parse_amount(&json!("25rb")), Some(Money::from_rupiah(25_000)));
        assert_eq!(parse_amount(&json!("1,5jt")), Some(Money::from_rupiah(1_500_000)));
        assert_eq!(parse_amount(&json!("50k")), Some(Money::from_rupiah(50_000)));
        assert_eq!(parse_amount(&json!("gratis")), None);
        assert_eq!(parse_amount(&json!(null)), None);
    }

    #[test]
    fn test_interpret_transaction() {
        let value = json!({
            "type": "expense",
            "amount": "35rb",
            "category": "makanan",
            "description": "Makan siang",
            "date": "2025-01-14"
        });
        let parsed = interpret_transaction(&value, today()).unwrap();
        assert_eq!(parsed.kind, TransactionKind::Expense);
        assert_eq!(parsed.amount, Money::from_rupiah(35_000));
        assert_eq!(parsed.category, "Makanan & Minuman");
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2025, 1, 14).unwrap());

        let input = parsed.to_input();
        assert_eq!(input.source, TransactionSource::Text);
    }

    #[test]
    fn test_interpret_transaction_defaults() {
        let parsed = interpret_transaction(&json!({"amount": 10000}), today()).unwrap();
        assert_eq!(parsed.kind, TransactionKind::Expense);
        assert_eq!(parsed.category, "Lainnya");
        assert_eq!(parsed.date, today());

        assert!(interpret_transaction(&json!({"amount": 0}), today()).is_err());
    }

    #[test]
    fn test_interpret_receipt() {
        let value = json!({
            "merchant": "Indomaret",
            "date": "14/01/2025",
            "total": null,
            "items": [
                {"name": "Susu", "quantity": 2, "price": 18000},
                {"name": "Roti", "price": "12.500"},
                {"name": "", "price": 1000}
            ],
            "category": "groceries"
        });
        let receipt = interpret_receipt(&value).unwrap();
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.total, Money::from_rupiah(30_500));
        assert_eq!(receipt.category, "Belanja");
        assert_eq!(receipt.date, NaiveDate::from_ymd_opt(2025, 1, 14));

        let input = receipt.to_input(today());
        assert_eq!(input.description.as_deref(), Some("Belanja di Indomaret"));
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2025, 1, 14).unwrap());
    }

    #[test]
    fn test_extract_message_content() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "{\"a\":1}"}}]});
        assert_eq!(extract_message_content(&body).unwrap(), "{\"a\":1}");

        let parts = json!({"choices": [{"message": {"content": [{"type": "text", "text": "ok"}]}}]});
        assert_eq!(extract_message_content(&parts).unwrap(), "ok");

        assert!(extract_message_content(&json!({"choices": []})).is_err());
        assert!(extract_message_content(&json!({"error": {"message": "rate limited"}})).is_err());
    }

    #[test]
    fn test_image_helpers() {
        assert_eq!(image_data_url(b"abc", "image/png"), "data:image/png;base64,YWJj");
        assert_eq!(mime_for_path(Path::new("struk.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("struk.txt")), None);
    }

    #[test]
    fn test_transport_error_hides_api_key() {
        let client = OpenRouterClient::new("SECRETKEY123", "m", 5)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let err = client.parse_transaction_text("makan 20rb", today).unwrap_err();
        assert!(matches!(err, DompetError::Http(_)));
        assert!(!err.to_string().contains("SECRETKEY123"), "{}", err);
    }
}
