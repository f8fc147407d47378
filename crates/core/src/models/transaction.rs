//! Income and expense records

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::validation(
                "kind",
                format!("expected income or expense, got '{}'", other),
            )),
        }
    }
}

/// A single income or expense entry. Amounts are in minor units (cents).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub amount_cents: i64,
    pub category: String,
    pub description: Option<String>,
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating or replacing a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    pub amount_cents: i64,
    pub category: String,
    pub description: Option<String>,
    pub occurred_on: NaiveDate,
}

impl TransactionInput {
    pub fn validate(&self) -> Result<()> {
        if self.amount_cents <= 0 {
            return Err(Error::validation("amount", "must be greater than zero"));
        }
        if self.category.trim().is_empty() {
            return Err(Error::validation("category", "must not be empty"));
        }
        Ok(())
    }

    pub fn into_transaction(self, user_id: Uuid, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id,
            kind: self.kind,
            amount_cents: self.amount_cents,
            category: self.category.trim().to_string(),
            description: self.description,
            occurred_on: self.occurred_on,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Query parameters for listing transactions. Every bound is inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: i64, category: &str) -> TransactionInput {
        TransactionInput {
            kind: TransactionKind::Expense,
            amount_cents: amount,
            category: category.into(),
            description: None,
            occurred_on: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        }
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        assert!(matches!(
            input(0, "food").validate(),
            Err(Error::Validation { field: "amount", .. })
        ));
        assert!(input(-5, "food").validate().is_err());
        assert!(input(5, "food").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_category() {
        assert!(matches!(
            input(100, "   ").validate(),
            Err(Error::Validation { field: "category", .. })
        ));
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert!("salary".parse::<TransactionKind>().is_err());
    }
}
