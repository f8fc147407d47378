//! User storage operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{fmt_datetime, parse_datetime, parse_datetime_opt, parse_uuid, OptionalExt};
use crate::error::{Error, Result};
use crate::models::{ProfileUpdate, User};

const USER_COLUMNS: &str =
    "id, username, full_name, password_hash, created_at, updated_at, last_login";

pub struct UserStore<'a> {
    conn: &'a Connection,
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(5)?)?,
        last_login: parse_datetime_opt(row.get::<_, Option<String>>(6)?)?,
    })
}

impl<'a> UserStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new user
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub fn create(&self, user: &User) -> Result<()> {
        let result = self.conn.execute(
            "INSERT INTO users (id, username, full_name, password_hash, created_at, updated_at, last_login)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id.to_string(),
                user.username,
                user.full_name,
                user.password_hash,
                fmt_datetime(user.created_at),
                fmt_datetime(user.updated_at),
                user.last_login.map(fmt_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            // Only the username column can collide on insert
            Err(e) if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                Err(Error::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Find user by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![id.to_string()],
                user_from_row,
            )
            .optional()?;

        Ok(user)
    }

    /// Find user by username
    #[instrument(skip(self))]
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                params![username],
                user_from_row,
            )
            .optional()?;

        Ok(user)
    }

    /// Apply a profile patch
    #[instrument(skip(self, patch))]
    pub fn update(&self, id: Uuid, patch: &ProfileUpdate, now: DateTime<Utc>) -> Result<User> {
        let changed = self.conn.execute(
            "UPDATE users SET full_name = COALESCE(?1, full_name), updated_at = ?2 WHERE id = ?3",
            params![patch.full_name, fmt_datetime(now), id.to_string()],
        )?;
        if changed == 0 {
            return Err(Error::NotFound("User".into()));
        }

        self.find_by_id(id)?
            .ok_or_else(|| Error::NotFound("User".into()))
    }

    /// Compare-and-set the password hash
    #[instrument(skip(self, expected_hash, new_hash))]
    pub fn replace_password_hash(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET password_hash = ?1, updated_at = ?2
             WHERE id = ?3 AND password_hash = ?4",
            params![new_hash, fmt_datetime(now), id.to_string(), expected_hash],
        )?;
        Ok(changed == 1)
    }

    /// Update last login time
    pub fn update_last_login(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET last_login = ?1 WHERE id = ?2",
            params![fmt_datetime(now), user_id.to_string()],
        )?;
        Ok(())
    }

    /// Delete a user; owned rows go with it via ON DELETE CASCADE
    #[instrument(skip(self))]
    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.conn
            .execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn user(name: &str) -> User {
        User::new(name.into(), "Test User".into(), "hash-v1".into(), Utc::now())
    }

    #[test]
    fn test_create_and_find() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let store = UserStore::new(&conn);
        let alice = user("alice");
        store.create(&alice).unwrap();

        let by_name = store.find_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name.id, alice.id);
        assert_eq!(by_name.password_hash, "hash-v1");

        let by_id = store.find_by_id(alice.id).unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert!(store.find_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let store = UserStore::new(&conn);
        store.create(&user("bob")).unwrap();

        assert!(matches!(
            store.create(&user("bob")),
            Err(Error::DuplicateUsername)
        ));
    }

    #[test]
    fn test_replace_password_hash_is_compare_and_set() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let store = UserStore::new(&conn);
        let u = user("carol");
        store.create(&u).unwrap();

        assert!(store
            .replace_password_hash(u.id, "hash-v1", "hash-v2", Utc::now())
            .unwrap());
        // Stale expectation loses
        assert!(!store
            .replace_password_hash(u.id, "hash-v1", "hash-v3", Utc::now())
            .unwrap());
        assert_eq!(
            store.find_by_id(u.id).unwrap().unwrap().password_hash,
            "hash-v2"
        );
    }

    #[test]
    fn test_update_profile() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let store = UserStore::new(&conn);
        let u = user("dave");
        store.create(&u).unwrap();

        let patch = ProfileUpdate {
            full_name: Some("Dave Smith".into()),
        };
        let updated = store.update(u.id, &patch, Utc::now()).unwrap();
        assert_eq!(updated.full_name, "Dave Smith");

        let missing = store.update(Uuid::new_v4(), &patch, Utc::now());
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }
}
