//! Session storage operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{fmt_datetime, parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{ClientInfo, Session};

pub struct SessionStore<'a> {
    conn: &'a Connection,
}

impl<'a> SessionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a session
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub fn create(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (id, user_id, token, created_at, expires_at, user_agent, origin)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.id.to_string(),
                session.user_id.to_string(),
                session.token,
                fmt_datetime(session.created_at),
                fmt_datetime(session.expires_at),
                session.client.user_agent,
                session.client.origin,
            ],
        )?;
        Ok(())
    }

    /// Find session by bearer token, expired or not
    #[instrument(skip_all)]
    pub fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        let session = self
            .conn
            .query_row(
                "SELECT id, user_id, token, created_at, expires_at, user_agent, origin
                 FROM sessions WHERE token = ?1",
                params![token],
                |row| {
                    Ok(Session {
                        id: parse_uuid(&row.get::<_, String>(0)?)?,
                        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
                        token: row.get(2)?,
                        created_at: parse_datetime(&row.get::<_, String>(3)?)?,
                        expires_at: parse_datetime(&row.get::<_, String>(4)?)?,
                        client: ClientInfo {
                            user_agent: row.get(5)?,
                            origin: row.get(6)?,
                        },
                    })
                },
            )
            .optional()?;

        Ok(session)
    }

    /// Delete session
    #[instrument(skip_all)]
    pub fn delete_by_token(&self, token: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    /// Delete all sessions for user
    pub fn delete_for_user(&self, user_id: Uuid) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM sessions WHERE user_id = ?1",
            params![user_id.to_string()],
        )?;
        Ok(count as u64)
    }

    /// Clean up expired sessions
    pub fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![fmt_datetime(now)],
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::storage::{Database, UserStore};
    use chrono::Duration;

    fn session_for(db: &Database, token: &str, now: DateTime<Utc>, ttl: Duration) -> Session {
        let conn = db.conn();
        let user = User::new(format!("user_{}", token), "U".into(), "h".into(), now);
        UserStore::new(&conn).create(&user).unwrap();
        let session = Session::new(user.id, token.into(), now, ttl, ClientInfo::default());
        SessionStore::new(&conn).create(&session).unwrap();
        session
    }

    #[test]
    fn test_find_and_delete_by_token() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        let session = session_for(&db, "tok-a", now, Duration::hours(1));

        let conn = db.conn();
        let store = SessionStore::new(&conn);
        let found = store.find_by_token("tok-a").unwrap().unwrap();
        assert_eq!(found.id, session.id);
        // Stored at microsecond precision
        assert_eq!(fmt_datetime(found.expires_at), fmt_datetime(session.expires_at));

        store.delete_by_token("tok-a").unwrap();
        assert!(store.find_by_token("tok-a").unwrap().is_none());
        // Second delete is a no-op
        store.delete_by_token("tok-a").unwrap();
    }

    #[test]
    fn test_delete_expired_only_removes_expired() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        session_for(&db, "old", now - Duration::hours(2), Duration::hours(1));
        session_for(&db, "edge", now - Duration::hours(1), Duration::hours(1));
        session_for(&db, "live", now, Duration::hours(1));

        let conn = db.conn();
        let store = SessionStore::new(&conn);
        assert_eq!(store.delete_expired(now).unwrap(), 2);
        assert!(store.find_by_token("live").unwrap().is_some());
        assert!(store.find_by_token("edge").unwrap().is_none());
    }

    #[test]
    fn test_sessions_cascade_with_user() {
        let db = Database::open_in_memory().unwrap();
        let session = session_for(&db, "tok-c", Utc::now(), Duration::hours(1));

        let conn = db.conn();
        UserStore::new(&conn).delete(session.user_id).unwrap();
        assert!(SessionStore::new(&conn)
            .find_by_token("tok-c")
            .unwrap()
            .is_none());
    }
}
