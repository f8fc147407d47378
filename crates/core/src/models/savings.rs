//! Savings goal model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_cents: i64,
    pub saved_cents: i64,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavingsGoal {
    pub fn is_reached(&self) -> bool {
        self.saved_cents >= self.target_cents
    }

    /// Whole-number percentage, capped at 100
    pub fn progress_percent(&self) -> u8 {
        if self.target_cents <= 0 {
            return 100;
        }
        let percent = i128::from(self.saved_cents.max(0)) * 100 / i128::from(self.target_cents);
        percent.min(100) as u8
    }

    pub fn contribute(&mut self, amount_cents: i64, now: DateTime<Utc>) -> Result<()> {
        if amount_cents <= 0 {
            return Err(Error::validation("amount", "must be greater than zero"));
        }
        self.saved_cents = self
            .saved_cents
            .checked_add(amount_cents)
            .ok_or_else(|| Error::validation("amount", "too large"))?;
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSavingsGoal {
    pub name: String,
    pub target_cents: i64,
    pub deadline: Option<NaiveDate>,
}

impl NewSavingsGoal {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name", "must not be empty"));
        }
        if self.target_cents <= 0 {
            return Err(Error::validation("target", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn into_goal(self, user_id: Uuid, now: DateTime<Utc>) -> SavingsGoal {
        SavingsGoal {
            id: Uuid::new_v4(),
            user_id,
            name: self.name.trim().to_string(),
            target_cents: self.target_cents,
            saved_cents: 0,
            deadline: self.deadline,
            created_at: now,
            updated_at: now,
        }
    }
}
