//! Debts and debt payments
//!
//! Balance updates are compare-and-set against the balance that was read,
//! retried a few times before giving up with `Conflict`.

use chrono::NaiveDate;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{Ledger, DEBT_PAYMENT_CATEGORY, WRITE_ATTEMPTS};
use crate::cache::{CacheKey, Namespace};
use crate::error::{Error, Result};
use crate::models::{Debt, NewDebt, TransactionInput, TransactionKind};
use crate::storage::Storage;

impl<S: Storage> Ledger<S> {
    /// Open debts first, soonest due first
    pub fn debts(&self, token: &str) -> Result<Vec<Debt>> {
        let user_id = self.acting_user(token)?;
        self.read_through(CacheKey::bare(Namespace::Debts, user_id), || {
            self.store.list_debts(user_id)
        })
    }

    #[instrument(skip_all)]
    pub fn add_debt(&self, token: &str, new: NewDebt) -> Result<Debt> {
        let user_id = self.acting_user(token)?;
        new.validate()?;

        let debt = new.into_debt(user_id, self.clock.now());
        self.store.insert_debt(&debt)?;
        self.invalidate(user_id, &[Namespace::Debts]);
        Ok(debt)
    }

    /// Pay down a debt and record the payment as an expense.
    ///
    /// Payments above the remaining balance are capped; the recorded
    /// expense is the amount actually applied.
    #[instrument(skip(self, token))]
    pub fn record_debt_payment(
        &self,
        token: &str,
        id: Uuid,
        amount_cents: i64,
        paid_on: NaiveDate,
    ) -> Result<Debt> {
        let user_id = self.acting_user(token)?;
        let now = self.clock.now();

        for _ in 0..WRITE_ATTEMPTS {
            let mut debt = self
                .store
                .find_debt(user_id, id)?
                .ok_or_else(|| Error::NotFound("Debt".into()))?;
            let expected_remaining = debt.remaining_cents;
            let applied = debt.apply_payment(amount_cents, now)?;
            let payment = TransactionInput {
                kind: TransactionKind::Expense,
                amount_cents: applied,
                category: DEBT_PAYMENT_CATEGORY.to_string(),
                description: Some(debt.creditor.clone()),
                occurred_on: paid_on,
            }
            .into_transaction(user_id, now);

            if self
                .store
                .record_debt_payment(&debt, expected_remaining, &payment)?
            {
                self.invalidate(
                    user_id,
                    &[Namespace::Debts, Namespace::Transactions, Namespace::Summary],
                );
                info!(%user_id, applied, remaining = debt.remaining_cents, "Debt payment recorded");
                return Ok(debt);
            }
            debug!(%id, "Debt balance moved during payment, retrying");
        }
        Err(Error::Conflict("Debt".into()))
    }

    #[instrument(skip(self, token))]
    pub fn delete_debt(&self, token: &str, id: Uuid) -> Result<()> {
        let user_id = self.acting_user(token)?;
        if !self.store.delete_debt(user_id, id)? {
            return Err(Error::NotFound("Debt".into()));
        }
        self.invalidate(user_id, &[Namespace::Debts]);
        Ok(())
    }
}
