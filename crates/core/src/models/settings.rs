//! Per-user display settings

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(Error::validation(
                "theme",
                format!("expected light, dark or system, got '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub user_id: Uuid,
    /// ISO 4217 code
    pub currency: String,
    pub theme: Theme,
    pub week_starts_on_monday: bool,
    pub updated_at: DateTime<Utc>,
}

impl Settings {
    /// What a user sees before saving anything
    pub fn defaults_for(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            currency: "USD".to_string(),
            theme: Theme::default(),
            week_starts_on_monday: true,
            updated_at: now,
        }
    }
}

/// Partial settings change; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub currency: Option<String>,
    pub theme: Option<Theme>,
    pub week_starts_on_monday: Option<bool>,
}

impl SettingsUpdate {
    pub fn apply(self, settings: &mut Settings, now: DateTime<Utc>) -> Result<()> {
        if let Some(currency) = self.currency {
            let currency = currency.trim().to_ascii_uppercase();
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(Error::validation("currency", "must be a 3-letter code"));
            }
            settings.currency = currency;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(monday) = self.week_starts_on_monday {
            settings.week_starts_on_monday = monday;
        }
        settings.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_normalizes_currency() {
        let mut settings = Settings::defaults_for(Uuid::new_v4(), Utc::now());
        SettingsUpdate {
            currency: Some(" eur ".into()),
            theme: Some(Theme::Dark),
            ..Default::default()
        }
        .apply(&mut settings, Utc::now())
        .unwrap();

        assert_eq!(settings.currency, "EUR");
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.week_starts_on_monday);
    }

    #[test]
    fn test_apply_rejects_bad_currency() {
        let mut settings = Settings::defaults_for(Uuid::new_v4(), Utc::now());
        let result = SettingsUpdate {
            currency: Some("EURO".into()),
            ..Default::default()
        }
        .apply(&mut settings, Utc::now());

        assert!(matches!(result, Err(Error::Validation { field: "currency", .. })));
        assert_eq!(settings.currency, "USD");
    }
}
