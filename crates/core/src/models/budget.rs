//! Monthly category budgets

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation("period", "month must be 1-12"));
        }
        // Rejects years chrono cannot represent
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::validation("period", "year out of range"))?;
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::validation("period", format!("expected YYYY-MM, got '{}'", s));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Spending limit for one category in one month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub period: YearMonth,
    pub limit_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetInput {
    pub category: String,
    pub period: YearMonth,
    pub limit_cents: i64,
}

impl BudgetInput {
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(Error::validation("category", "must not be empty"));
        }
        if self.limit_cents <= 0 {
            return Err(Error::validation("limit", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn into_budget(self, user_id: Uuid, now: DateTime<Utc>) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            user_id,
            category: self.category.trim().to_string(),
            period: self.period,
            limit_cents: self.limit_cents,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ym: YearMonth = "2026-02".parse().unwrap();
        assert_eq!(ym.year(), 2026);
        assert_eq!(ym.month(), 2);
        assert_eq!(ym.to_string(), "2026-02");
    }

    #[test]
    fn test_rejects_bad_periods() {
        assert!("2026-13".parse::<YearMonth>().is_err());
        assert!("2026".parse::<YearMonth>().is_err());
        assert!("abcd-01".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_month_bounds() {
        let feb: YearMonth = "2028-02".parse().unwrap();
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());

        let dec: YearMonth = "2026-12".parse().unwrap();
        assert_eq!(dec.first_day(), NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
        assert!(dec.contains(NaiveDate::from_ymd_opt(2026, 12, 15).unwrap()));
        assert!(!dec.contains(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()));
    }

    #[test]
    fn test_serde_as_string() {
        let ym = YearMonth::new(2026, 7).unwrap();
        assert_eq!(serde_json::to_string(&ym).unwrap(), "\"2026-07\"");
        let back: YearMonth = serde_json::from_str("\"2026-07\"").unwrap();
        assert_eq!(back, ym);
    }
}
