//! Settings storage operations

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse::{fmt_datetime, parse_datetime, parse_text, OptionalExt};
use crate::error::Result;
use crate::models::Settings;

pub struct SettingsStore<'a> {
    conn: &'a Connection,
}

impl<'a> SettingsStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Save user settings
    pub fn save(&self, settings: &Settings) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (user_id, currency, theme, week_starts_on_monday, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                settings.user_id.to_string(),
                settings.currency,
                settings.theme.as_str(),
                settings.week_starts_on_monday as i32,
                fmt_datetime(settings.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Load user settings
    pub fn load(&self, user_id: Uuid) -> Result<Option<Settings>> {
        let settings = self
            .conn
            .query_row(
                "SELECT currency, theme, week_starts_on_monday, updated_at
                 FROM settings WHERE user_id = ?1",
                params![user_id.to_string()],
                |row| {
                    Ok(Settings {
                        user_id,
                        currency: row.get(0)?,
                        theme: parse_text(&row.get::<_, String>(1)?)?,
                        week_starts_on_monday: row.get::<_, i32>(2)? != 0,
                        updated_at: parse_datetime(&row.get::<_, String>(3)?)?,
                    })
                },
            )
            .optional()?;

        Ok(settings)
    }
}
