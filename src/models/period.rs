//! Calendar month used for budgets, summaries and reports

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month (e.g. "2025-01")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    /// Create a month, returning None for an invalid month number
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && NaiveDate::from_ymd_opt(year, month, 1).is_some() {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing today's local date
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    /// The month containing a date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        self.next().start_date() - Duration::days(1)
    }

    pub fn days(&self) -> i64 {
        (self.end_date() - self.start_date()).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Number of months from `self` to `other` (negative when other is earlier)
    pub fn months_until(&self, other: &Month) -> i64 {
        (other.year as i64 - self.year as i64) * 12 + (other.month as i64 - self.month as i64)
    }

    /// Parse "YYYY-MM", "current"/"this" or "last"/"previous"
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "current" | "this" | "now" => return Ok(Self::current()),
            "last" | "previous" | "prev" => return Ok(Self::current().prev()),
            _ => {}
        }

        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month '{}'. Use YYYY-MM", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in '{}'", s))?;

        Self::new(year, month).ok_or_else(|| format!("Month out of range: '{}'", s))
    }

    /// Human-friendly name, e.g. "Januari 2025"
    pub fn display_name(&self) -> String {
        const NAMES: [&str; 12] = [
            "Januari",
            "Februari",
            "Maret",
            "April",
            "Mei",
            "Juni",
            "Juli",
            "Agustus",
            "September",
            "Oktober",
            "November",
            "Desember",
        ];
        format!("{} {}", NAMES[(self.month - 1) as usize], self.year)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Add calendar months to a date, clamping the day to the target month's length
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let target = Month { year, month };
    let day = date.day().min(target.end_date().day());
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| target.end_date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bounds() {
        let feb = Month::new(2024, 2).unwrap();
        assert_eq!(feb.start_date(), date(2024, 2, 1));
        assert_eq!(feb.end_date(), date(2024, 2, 29));
        assert_eq!(feb.days(), 29);
        assert!(feb.contains(date(2024, 2, 15)));
        assert!(!feb.contains(date(2024, 3, 1)));
    }

    #[test]
    fn test_navigation() {
        let dec = Month::new(2024, 12).unwrap();
        assert_eq!(dec.next(), Month::new(2025, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
        assert_eq!(dec.months_until(&Month::new(2025, 3).unwrap()), 3);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Month::parse("2025-01").unwrap(), Month::new(2025, 1).unwrap());
        assert_eq!(Month::parse("current").unwrap(), Month::current());
        assert_eq!(Month::parse("last").unwrap(), Month::current().prev());
        assert!(Month::parse("2025-13").is_err());
        assert!(Month::parse("januari").is_err());
    }

    #[test]
    fn test_display() {
        let m = Month::new(2025, 3).unwrap();
        assert_eq!(m.to_string(), "2025-03");
        assert_eq!(m.display_name(), "Maret 2025");
    }

    #[test]
    fn test_add_months_clamps() {
        assert_eq!(add_months(date(2025, 1, 31), 1), date(2025, 2, 28));
        assert_eq!(add_months(date(2024, 2, 29), 12), date(2025, 2, 28));
        assert_eq!(add_months(date(2025, 11, 15), 3), date(2026, 2, 15));
        assert_eq!(add_months(date(2025, 1, 10), -1), date(2024, 12, 10));
    }
}
