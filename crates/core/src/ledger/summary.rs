//! Monthly dashboard

use super::Ledger;
use crate::cache::{CacheKey, Namespace};
use crate::error::Result;
use crate::models::{MonthlySummary, TransactionFilter, YearMonth};
use crate::storage::Storage;

impl<S: Storage> Ledger<S> {
    /// Income, spending by category and budget status for one month
    pub fn monthly_summary(&self, token: &str, period: YearMonth) -> Result<MonthlySummary> {
        let user_id = self.acting_user(token)?;
        let key = CacheKey::new(Namespace::Summary, user_id, &period.to_string())?;
        self.read_through(key, || {
            let filter = TransactionFilter::between(period.first_day(), period.last_day());
            let transactions = self.store.list_transactions(user_id, &filter)?;
            let budgets = self.store.list_budgets(user_id, period)?;
            MonthlySummary::compute(period, &transactions, &budgets)
        })
    }
}
