//! Transaction kinds and the built-in category lists
//!
//! Categories are plain names. The built-in lists seed prompts and the
//! normaliser; any other non-empty name is accepted as a custom category.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn default_categories(&self) -> &'static [&'static str] {
        match self {
            Self::Income => INCOME_CATEGORIES,
            Self::Expense => EXPENSE_CATEGORIES,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Pemasukan",
            Self::Expense => "Pengeluaran",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" | "pemasukan" | "masuk" => Ok(Self::Income),
            "expense" | "out" | "pengeluaran" | "keluar" => Ok(Self::Expense),
            other => Err(format!(
                "Unknown transaction type '{}'. Use income or expense",
                other
            )),
        }
    }
}

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Makanan & Minuman",
    "Transportasi",
    "Belanja",
    "Tagihan",
    "Hiburan",
    "Kesehatan",
    "Pendidikan",
    "Tabungan",
    "Lainnya",
];

pub const INCOME_CATEGORIES: &[&str] = &["Gaji", "Bonus", "Investasi", "Hadiah", "Lainnya"];

/// Category used for goal contributions and withdrawals
pub const SAVINGS_CATEGORY: &str = "Tabungan";

/// Category used for bills without an explicit category
pub const BILLS_CATEGORY: &str = "Tagihan";

/// Common aliases mapped onto built-in categories
const ALIASES: &[(&str, &str)] = &[
    ("makanan", "Makanan & Minuman"),
    ("minuman", "Makanan & Minuman"),
    ("makan", "Makanan & Minuman"),
    ("food", "Makanan & Minuman"),
    ("food & drink", "Makanan & Minuman"),
    ("groceries", "Belanja"),
    ("shopping", "Belanja"),
    ("transport", "Transportasi"),
    ("transportation", "Transportasi"),
    ("bills", "Tagihan"),
    ("utilities", "Tagihan"),
    ("entertainment", "Hiburan"),
    ("health", "Kesehatan"),
    ("education", "Pendidikan"),
    ("savings", "Tabungan"),
    ("salary", "Gaji"),
    ("investment", "Investasi"),
    ("gift", "Hadiah"),
    ("other", "Lainnya"),
    ("others", "Lainnya"),
];

/// Map a user- or model-supplied category onto the canonical spelling
///
/// Returns None for an empty name.
pub fn normalize_category(kind: TransactionKind, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(found) = kind
        .default_categories()
        .iter()
        .find(|c| c.eq_ignore_ascii_case(trimmed))
    {
        return Some((*found).to_string());
    }

    let lowered = trimmed.to_lowercase();
    for (alias, canonical) in ALIASES {
        if *alias == lowered && kind.default_categories().contains(canonical) {
            return Some((*canonical).to_string());
        }
    }

    Some(trimmed.to_string())
}

/// Case-insensitive category comparison
pub fn same_category(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
