//! Money type for representing Rupiah amounts
//!
//! Internally stores amounts in minor units (hundredths, "sen") as i64 to avoid
//! floating-point precision issues. Display uses Indonesian grouping
//! (`Rp1.250.000`, `Rp10,50`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount stored as minor units (hundredths of a Rupiah)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount accepted from user or model input (Rp1.000.000.000.000.000)
    pub const MAX: Money = Money::from_rupiah(1_000_000_000_000_000);

    /// Create a Money amount from minor units
    ///
    /// # Examples
    /// ```
    /// use dompet::models::Money;
    /// let amount = Money::from_minor(1050); // Rp10,50
    /// assert_eq!(amount.to_string(), "Rp10,50");
    /// ```
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Create a Money amount from whole Rupiah
    ///
    /// # Examples
    /// ```
    /// use dompet::models::Money;
    /// let amount = Money::from_rupiah(25_000);
    /// assert_eq!(amount.to_string(), "Rp25.000");
    /// ```
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Self(rupiah * 100)
    }

    /// Convert a floating amount in Rupiah (as returned by LLM tools) to Money
    pub fn from_major_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let minor = (value * 100.0).round();
        if minor.abs() > Self::MAX.0 as f64 {
            return None;
        }
        Some(Self(minor as i64))
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Whole Rupiah portion (truncated toward zero)
    pub const fn rupiah(&self) -> i64 {
        self.0 / 100
    }

    /// Minor portion (0-99)
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Percentage of `self` relative to `total` (0.0 when total is zero)
    pub fn percent_of(&self, total: Money) -> f64 {
        if total.is_zero() {
            0.0
        } else {
            self.0 as f64 / total.0 as f64 * 100.0
        }
    }

    /// Parse a money amount from a string
    ///
    /// Accepts `50000`, `10.5`, `10.50`, `Rp 1.250.000`, `1.250.000,50`
    /// and a leading `-`. A dot followed by exactly three digits is a
    /// thousands separator; a comma is the decimal separator.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let original = s;
        let invalid = || MoneyParseError::InvalidFormat(original.trim().to_string());

        let s = s.trim();
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, s),
        };

        let s = match s.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("rp") => &s[2..],
            _ => s,
        };
        let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if s.is_empty() {
            return Err(invalid());
        }

        let (whole, fraction) = if let Some((int_part, frac_part)) = s.split_once(',') {
            if frac_part.contains(',') || frac_part.contains('.') {
                return Err(invalid());
            }
            (parse_grouped(int_part).ok_or_else(invalid)?, frac_part)
        } else if s.contains('.') {
            let groups: Vec<&str> = s.split('.').collect();
            if groups.len() == 2 && groups[1].len() != 3 {
                (parse_digits(groups[0]).ok_or_else(invalid)?, groups[1])
            } else {
                (parse_grouped(&s).ok_or_else(invalid)?, "")
            }
        } else {
            (parse_digits(&s).ok_or_else(invalid)?, "")
        };

        let minor_part = match fraction.len() {
            0 => 0,
            1 => parse_digits(fraction).ok_or_else(invalid)? * 10,
            2 => parse_digits(fraction).ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };

        let minor = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(minor_part))
            .ok_or_else(invalid)?;
        if minor > Self::MAX.0 {
            return Err(MoneyParseError::OutOfRange(original.trim().to_string()));
        }

        Ok(Self(if negative { -minor } else { minor }))
    }

    /// Format with a currency symbol using Indonesian grouping
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let grouped = group_thousands(self.rupiah().unsigned_abs());
        if self.minor_part() == 0 {
            format!("{}{}{}", sign, symbol, grouped)
        } else {
            format!("{}{}{},{:02}", sign, symbol, grouped, self.minor_part())
        }
    }
}

fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse `1.250.000` style integers; every group after the first has 3 digits
fn parse_grouped(s: &str) -> Option<i64> {
    let groups: Vec<&str> = s.split('.').collect();
    let first = groups.first()?;
    if first.is_empty() || (groups.len() > 1 && first.len() > 3) {
        return None;
    }
    if groups[1..].iter().any(|g| g.len() != 3) {
        return None;
    }
    parse_digits(&groups.concat())
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format_with_symbol("Rp"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    OutOfRange(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::OutOfRange(s) => {
                write!(f, "Amount too large: {} (max {})", s, Money::MAX)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}
