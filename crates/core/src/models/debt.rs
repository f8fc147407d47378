//! Debt model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Money owed to a creditor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Debt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub creditor: String,
    pub principal_cents: i64,
    pub remaining_cents: i64,
    /// Annual interest in basis points (1% = 100)
    pub interest_rate_bps: Option<u32>,
    pub due_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debt {
    pub fn is_settled(&self) -> bool {
        self.remaining_cents == 0
    }

    pub fn paid_cents(&self) -> i64 {
        self.principal_cents - self.remaining_cents
    }

    /// Apply a payment, returning the amount actually applied.
    ///
    /// Overpayment is capped at the remaining balance.
    pub fn apply_payment(&mut self, amount_cents: i64, now: DateTime<Utc>) -> Result<i64> {
        if amount_cents <= 0 {
            return Err(Error::validation("amount", "must be greater than zero"));
        }
        if self.is_settled() {
            return Err(Error::validation("debt", "already settled"));
        }
        let applied = amount_cents.min(self.remaining_cents);
        self.remaining_cents -= applied;
        self.updated_at = now;
        Ok(applied)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDebt {
    pub creditor: String,
    pub principal_cents: i64,
    pub interest_rate_bps: Option<u32>,
    pub due_on: Option<NaiveDate>,
}

impl NewDebt {
    pub fn validate(&self) -> Result<()> {
        if self.creditor.trim().is_empty() {
            return Err(Error::validation("creditor", "must not be empty"));
        }
        if self.principal_cents <= 0 {
            return Err(Error::validation("principal", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn into_debt(self, user_id: Uuid, now: DateTime<Utc>) -> Debt {
        Debt {
            id: Uuid::new_v4(),
            user_id,
            creditor: self.creditor.trim().to_string(),
            principal_cents: self.principal_cents,
            remaining_cents: self.principal_cents,
            interest_rate_bps: self.interest_rate_bps,
            due_on: self.due_on,
            created_at: now,
            updated_at: now,
        }
    }
}
