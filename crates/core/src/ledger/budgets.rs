//! Monthly spending limits per category

use tracing::instrument;
use uuid::Uuid;

use super::Ledger;
use crate::cache::{CacheKey, Namespace};
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetInput, YearMonth};
use crate::storage::Storage;

const AFFECTED: &[Namespace] = &[Namespace::Budgets, Namespace::Summary];

impl<S: Storage> Ledger<S> {
    pub fn budgets(&self, token: &str, period: YearMonth) -> Result<Vec<Budget>> {
        let user_id = self.acting_user(token)?;
        let key = CacheKey::new(Namespace::Budgets, user_id, &period.to_string())?;
        self.read_through(key, || self.store.list_budgets(user_id, period))
    }

    /// Create the budget for (category, period) or replace its limit
    #[instrument(skip_all)]
    pub fn set_budget(&self, token: &str, input: BudgetInput) -> Result<Budget> {
        let user_id = self.acting_user(token)?;
        input.validate()?;

        let budget = self
            .store
            .upsert_budget(&input.into_budget(user_id, self.clock.now()))?;
        self.invalidate(user_id, AFFECTED);
        Ok(budget)
    }

    #[instrument(skip(self, token))]
    pub fn delete_budget(&self, token: &str, id: Uuid) -> Result<()> {
        let user_id = self.acting_user(token)?;
        if !self.store.delete_budget(user_id, id)? {
            return Err(Error::NotFound("Budget".into()));
        }
        self.invalidate(user_id, AFFECTED);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::ledger::testing::TestLedger;
    use crate::models::{BudgetInput, YearMonth};

    fn food(period: YearMonth, limit_cents: i64) -> BudgetInput {
        BudgetInput {
            category: "food".into(),
            period,
            limit_cents,
        }
    }

    #[test]
    fn test_set_budget_replaces_limit() {
        let t = TestLedger::new();
        let alice = t.sign_up("alice");
        let october = YearMonth::new(2026, 10).unwrap();

        let first = t.ledger.set_budget(&alice, food(october, 40_000)).unwrap();
        assert_eq!(t.ledger.budgets(&alice, october).unwrap()[0].limit_cents, 40_000);

        let second = t.ledger.set_budget(&alice, food(october, 45_000)).unwrap();
        assert_eq!(second.id, first.id);
        let listed = t.ledger.budgets(&alice, october).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].limit_cents, 45_000);
    }

    #[test]
    fn test_periods_are_separate() {
        let t = TestLedger::new();
        let alice = t.sign_up("alice");
        let october = YearMonth::new(2026, 10).unwrap();
        let november = YearMonth::new(2026, 11).unwrap();

        t.ledger.set_budget(&alice, food(october, 40_000)).unwrap();
        assert!(t.ledger.budgets(&alice, november).unwrap().is_empty());
        assert_eq!(t.ledger.budgets(&alice, october).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_budget() {
        let t = TestLedger::new();
        let alice = t.sign_up("alice");
        let bob = t.sign_up("bob");
        let october = YearMonth::new(2026, 10).unwrap();
        let budget = t.ledger.set_budget(&alice, food(october, 40_000)).unwrap();

        assert!(matches!(
            t.ledger.delete_budget(&bob, budget.id),
            Err(Error::NotFound(_))
        ));
        t.ledger.budgets(&alice, october).unwrap();
        t.ledger.delete_budget(&alice, budget.id).unwrap();
        assert!(t.ledger.budgets(&alice, october).unwrap().is_empty());
    }
}
