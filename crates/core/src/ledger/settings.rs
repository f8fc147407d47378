//! Per-user display preferences

use tracing::instrument;

use super::Ledger;
use crate::cache::{CacheKey, Namespace};
use crate::error::Result;
use crate::models::{Settings, SettingsUpdate};
use crate::storage::Storage;

impl<S: Storage> Ledger<S> {
    /// Saved settings, or the defaults if the user never saved any
    pub fn settings(&self, token: &str) -> Result<Settings> {
        let user_id = self.acting_user(token)?;
        self.read_through(CacheKey::bare(Namespace::Settings, user_id), || {
            Ok(self
                .store
                .find_settings(user_id)?
                .unwrap_or_else(|| Settings::defaults_for(user_id, self.clock.now())))
        })
    }

    #[instrument(skip_all)]
    pub fn update_settings(&self, token: &str, update: SettingsUpdate) -> Result<Settings> {
        let user_id = self.acting_user(token)?;
        let mut settings = self
            .store
            .find_settings(user_id)?
            .unwrap_or_else(|| Settings::defaults_for(user_id, self.clock.now()));
        update.apply(&mut settings, self.clock.now())?;

        self.store.save_settings(&settings)?;
        self.invalidate(user_id, &[Namespace::Settings]);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::ledger::testing::TestLedger;
    use crate::models::{SettingsUpdate, Theme};

    #[test]
    fn test_defaults_then_update() {
        let t = TestLedger::new();
        let token = t.sign_up("alice");

        let defaults = t.ledger.settings(&token).unwrap();
        assert_eq!(defaults.currency, "USD");
        assert_eq!(defaults.theme, Theme::System);

        t.ledger
            .update_settings(
                &token,
                SettingsUpdate {
                    currency: Some("eur".into()),
                    theme: Some(Theme::Dark),
                    ..Default::default()
                },
            )
            .unwrap();

        let settings = t.ledger.settings(&token).unwrap();
        assert_eq!(settings.currency, "EUR");
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.week_starts_on_monday);
    }

    #[test]
    fn test_invalid_update_keeps_cached_settings() {
        let t = TestLedger::new();
        let token = t.sign_up("alice");
        t.ledger.settings(&token).unwrap();

        let result = t.ledger.update_settings(
            &token,
            SettingsUpdate {
                currency: Some("dollars".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::Validation { field: "currency", .. })));
        assert_eq!(t.ledger.settings(&token).unwrap().currency, "USD");
    }

    #[test]
    fn test_settings_are_per_user() {
        let t = TestLedger::new();
        let alice = t.sign_up("alice");
        let bob = t.sign_up("bob");

        t.ledger
            .update_settings(
                &alice,
                SettingsUpdate {
                    theme: Some(Theme::Light),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(t.ledger.settings(&alice).unwrap().theme, Theme::Light);
        assert_eq!(t.ledger.settings(&bob).unwrap().theme, Theme::System);
    }
}
