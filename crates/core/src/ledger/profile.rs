//! Account profile, password changes and account deletion

use tracing::{info, instrument};
use uuid::Uuid;

use super::Ledger;
use crate::auth::validate_full_name;
use crate::cache::{CacheKey, Namespace};
use crate::error::{Error, Result};
use crate::models::{ProfileUpdate, User};
use crate::storage::Storage;

impl<S: Storage> Ledger<S> {
    /// The signed-in account. The password hash is never returned or cached.
    pub fn profile(&self, token: &str) -> Result<User> {
        let user_id = self.acting_user(token)?;
        self.read_through(CacheKey::bare(Namespace::Profile, user_id), || {
            let mut user = self
                .store
                .find_user_by_id(user_id)?
                .ok_or_else(|| Error::NotFound("Account".into()))?;
            user.password_hash.clear();
            Ok(user)
        })
    }

    #[instrument(skip_all)]
    pub fn update_profile(&self, token: &str, mut patch: ProfileUpdate) -> Result<User> {
        let user_id = self.acting_user(token)?;
        if let Some(name) = patch.full_name.take() {
            patch.full_name = Some(validate_full_name(&name)?);
        }
        if patch.is_empty() {
            return Err(Error::validation("profile", "nothing to update"));
        }

        let mut user = self.store.update_user(user_id, &patch, self.clock.now())?;
        self.invalidate(user_id, &[Namespace::Profile]);
        info!(%user_id, "Profile updated");
        user.password_hash.clear();
        Ok(user)
    }

    pub fn change_password(&self, token: &str, current: &str, new: &str) -> Result<()> {
        let user_id = self.acting_user(token)?;
        self.auth.change_password(user_id, current, new)?;
        self.invalidate(user_id, &[Namespace::Profile]);
        Ok(())
    }

    /// Delete the account and everything it owns, after re-checking the
    /// password
    pub fn delete_account(&self, token: &str, password: &str) -> Result<Uuid> {
        let user_id = self.auth.delete_account(token, password)?;
        self.cache.invalidate_user(user_id);
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::Clock;
    use crate::error::Error;
    use crate::ledger::testing::TestLedger;
    use crate::models::ProfileUpdate;
    use crate::storage::UserRepository;

    #[test]
    fn test_profile_is_read_through() {
        let t = TestLedger::new();
        let token = t.sign_up("alice");

        let profile = t.ledger.profile(&token).unwrap();
        assert_eq!(profile.username, "alice");
        assert!(profile.password_hash.is_empty());

        // A change behind the ledger's back stays invisible until TTL
        let patch = ProfileUpdate {
            full_name: Some("Changed Elsewhere".into()),
        };
        t.db.update_user(profile.id, &patch, t.clock.now()).unwrap();
        assert_eq!(t.ledger.profile(&token).unwrap().full_name, "Test Person");

        t.clock.advance(chrono::Duration::seconds(60));
        assert_eq!(t.ledger.profile(&token).unwrap().full_name, "Changed Elsewhere");
    }

    #[test]
    fn test_update_profile_is_visible_immediately() {
        let t = TestLedger::new();
        let token = t.sign_up("alice");
        t.ledger.profile(&token).unwrap();

        let updated = t
            .ledger
            .update_profile(
                &token,
                ProfileUpdate {
                    full_name: Some("  Alice Smith ".into()),
                },
            )
            .unwrap();
        assert_eq!(updated.full_name, "Alice Smith");
        assert_eq!(t.ledger.profile(&token).unwrap().full_name, "Alice Smith");

        assert!(matches!(
            t.ledger.update_profile(&token, ProfileUpdate::default()),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_change_password_through_ledger() {
        let t = TestLedger::new();
        let token = t.sign_up("alice");

        t.ledger
            .change_password(&token, "Secret123!", "Changed123!")
            .unwrap();
        assert!(t
            .ledger
            .login("alice", "Changed123!", Default::default())
            .is_ok());
    }

    #[test]
    fn test_delete_account_flushes_cache() {
        let t = TestLedger::new();
        let token = t.sign_up("alice");
        let id = t.ledger.profile(&token).unwrap().id;

        t.ledger.delete_account(&token, "Secret123!").unwrap();
        assert!(t.ledger.cache().is_empty());
        assert!(t.db.find_user_by_id(id).unwrap().is_none());
        assert!(matches!(
            t.ledger.login("alice", "Secret123!", Default::default()),
            Err(Error::InvalidCredentials)
        ));
    }
}
