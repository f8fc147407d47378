//! Income and expense entries

use tracing::{info, instrument};
use uuid::Uuid;

use super::Ledger;
use crate::cache::{CacheKey, Namespace};
use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionFilter, TransactionInput};
use crate::storage::Storage;

/// Namespaces whose results depend on the transaction table
const AFFECTED: &[Namespace] = &[Namespace::Transactions, Namespace::Summary];

impl<S: Storage> Ledger<S> {
    /// Transactions matching `filter`, newest first
    pub fn transactions(&self, token: &str, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let user_id = self.acting_user(token)?;
        let key = CacheKey::new(Namespace::Transactions, user_id, filter)?;
        self.read_through(key, || self.store.list_transactions(user_id, filter))
    }

    #[instrument(skip_all)]
    pub fn add_transaction(&self, token: &str, input: TransactionInput) -> Result<Transaction> {
        let user_id = self.acting_user(token)?;
        input.validate()?;

        let tx = input.into_transaction(user_id, self.clock.now());
        self.store.insert_transaction(&tx)?;
        self.invalidate(user_id, AFFECTED);
        info!(%user_id, id = %tx.id, "Transaction added");
        Ok(tx)
    }

    /// Replace every editable field of an existing transaction
    #[instrument(skip(self, token, input))]
    pub fn update_transaction(
        &self,
        token: &str,
        id: Uuid,
        input: TransactionInput,
    ) -> Result<Transaction> {
        let user_id = self.acting_user(token)?;
        input.validate()?;

        let existing = self
            .store
            .find_transaction(user_id, id)?
            .ok_or_else(|| Error::NotFound("Transaction".into()))?;
        let mut tx = input.into_transaction(user_id, self.clock.now());
        tx.id = existing.id;
        tx.created_at = existing.created_at;

        if !self.store.update_transaction(&tx)? {
            return Err(Error::NotFound("Transaction".into()));
        }
        self.invalidate(user_id, AFFECTED);
        Ok(tx)
    }

    #[instrument(skip(self, token))]
    pub fn delete_transaction(&self, token: &str, id: Uuid) -> Result<()> {
        let user_id = self.acting_user(token)?;
        if !self.store.delete_transaction(user_id, id)? {
            return Err(Error::NotFound("Transaction".into()));
        }
        self.invalidate(user_id, AFFECTED);
        Ok(())
    }
}
