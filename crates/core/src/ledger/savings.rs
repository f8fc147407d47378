//! Savings goals and contributions

use tracing::{debug, instrument};
use uuid::Uuid;

use super::{Ledger, WRITE_ATTEMPTS};
use crate::cache::{CacheKey, Namespace};
use crate::error::{Error, Result};
use crate::models::{NewSavingsGoal, SavingsGoal};
use crate::storage::Storage;

impl<S: Storage> Ledger<S> {
    pub fn savings_goals(&self, token: &str) -> Result<Vec<SavingsGoal>> {
        let user_id = self.acting_user(token)?;
        self.read_through(CacheKey::bare(Namespace::Savings, user_id), || {
            self.store.list_savings_goals(user_id)
        })
    }

    #[instrument(skip_all)]
    pub fn add_savings_goal(&self, token: &str, new: NewSavingsGoal) -> Result<SavingsGoal> {
        let user_id = self.acting_user(token)?;
        new.validate()?;

        let goal = new.into_goal(user_id, self.clock.now());
        self.store.insert_savings_goal(&goal)?;
        self.invalidate(user_id, &[Namespace::Savings]);
        Ok(goal)
    }

    #[instrument(skip(self, token))]
    pub fn contribute_to_goal(&self, token: &str, id: Uuid, amount_cents: i64) -> Result<SavingsGoal> {
        let user_id = self.acting_user(token)?;
        let now = self.clock.now();

        for _ in 0..WRITE_ATTEMPTS {
            let mut goal = self
                .store
                .find_savings_goal(user_id, id)?
                .ok_or_else(|| Error::NotFound("Savings goal".into()))?;
            let expected_saved = goal.saved_cents;
            goal.contribute(amount_cents, now)?;

            if self.store.replace_saved_cents(&goal, expected_saved)? {
                self.invalidate(user_id, &[Namespace::Savings]);
                return Ok(goal);
            }
            debug!(%id, "Saved amount moved during contribution, retrying");
        }
        Err(Error::Conflict("Savings goal".into()))
    }

    #[instrument(skip(self, token))]
    pub fn delete_savings_goal(&self, token: &str, id: Uuid) -> Result<()> {
        let user_id = self.acting_user(token)?;
        if !self.store.delete_savings_goal(user_id, id)? {
            return Err(Error::NotFound("Savings goal".into()));
        }
        self.invalidate(user_id, &[Namespace::Savings]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::ledger::testing::TestLedger;
    use crate::models::NewSavingsGoal;

    fn holiday() -> NewSavingsGoal {
        NewSavingsGoal {
            name: "Holiday".into(),
            target_cents: 100_000,
            deadline: None,
        }
    }

    #[test]
    fn test_contribution_is_visible_after_cached_read() {
        let t = TestLedger::new();
        let alice = t.sign_up("alice");
        let goal = t.ledger.add_savings_goal(&alice, holiday()).unwrap();
        assert_eq!(t.ledger.savings_goals(&alice).unwrap()[0].saved_cents, 0);

        let funded = t.ledger.contribute_to_goal(&alice, goal.id, 25_000).unwrap();
        assert_eq!(funded.progress_percent(), 25);
        assert_eq!(t.ledger.savings_goals(&alice).unwrap()[0].saved_cents, 25_000);
    }

    #[test]
    fn test_invalid_goal_and_contribution() {
        let t = TestLedger::new();
        let alice = t.sign_up("alice");
        let mut bad = holiday();
        bad.target_cents = 0;
        assert!(matches!(
            t.ledger.add_savings_goal(&alice, bad),
            Err(Error::Validation { .. })
        ));

        let goal = t.ledger.add_savings_goal(&alice, holiday()).unwrap();
        assert!(matches!(
            t.ledger.contribute_to_goal(&alice, goal.id, -5),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_delete_and_ownership() {
        let t = TestLedger::new();
        let alice = t.sign_up("alice");
        let bob = t.sign_up("bob");
        let goal = t.ledger.add_savings_goal(&alice, holiday()).unwrap();
        t.ledger.savings_goals(&alice).unwrap();

        assert!(matches!(
            t.ledger.contribute_to_goal(&bob, goal.id, 100),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            t.ledger.delete_savings_goal(&bob, goal.id),
            Err(Error::NotFound(_))
        ));

        t.ledger.delete_savings_goal(&alice, goal.id).unwrap();
        assert!(t.ledger.savings_goals(&alice).unwrap().is_empty());
    }
}
