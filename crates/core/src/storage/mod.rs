//! SQLite storage layer for Ledger
//!
//! This is the persistence collaborator behind the session manager and the
//! ledger. Each `*Store` borrows a connection and owns the SQL for one table;
//! [`Database`] guards the connection with a mutex and implements the
//! repository traits on top of the stores.

mod budgets;
mod debts;
mod migrations;
mod parse;
mod savings;
mod sessions;
mod settings;
mod traits;
mod transactions;
mod users;

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::instrument;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::Result;
use crate::models::{
    Budget, Debt, ProfileUpdate, SavingsGoal, Session, Settings, Transaction, TransactionFilter,
    User, YearMonth,
};

pub use budgets::BudgetStore;
pub use debts::DebtStore;
pub use savings::SavingsStore;
pub use sessions::SessionStore;
pub use settings::SettingsStore;
pub use traits::{
    BudgetRepository, DebtRepository, SavingsRepository, SessionRepository, SettingsRepository,
    Storage, TransactionRepository, UserRepository,
};
pub use transactions::TransactionStore;
pub use users::UserStore;

/// Main database handle
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path, config), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P, config: &StorageConfig) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn, config.busy_timeout())
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, StorageConfig::default().busy_timeout())
    }

    /// Configure the connection and run migrations
    fn init(conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn()
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Lock the connection. A panic while holding the lock leaves SQLite
    /// itself consistent, so a poisoned lock is still usable.
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UserRepository for Database {
    fn insert_user(&self, user: &User) -> Result<()> {
        UserStore::new(&self.conn()).create(user)
    }

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        UserStore::new(&self.conn()).find_by_id(id)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        UserStore::new(&self.conn()).find_by_username(username)
    }

    fn update_user(&self, id: Uuid, patch: &ProfileUpdate, now: DateTime<Utc>) -> Result<User> {
        UserStore::new(&self.conn()).update(id, patch, now)
    }

    fn replace_password_hash(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        UserStore::new(&self.conn()).replace_password_hash(id, expected_hash, new_hash, now)
    }

    fn update_last_login(&self, id: Uuid, now: DateTime<Utc>) -> Result<()> {
        UserStore::new(&self.conn()).update_last_login(id, now)
    }

    fn delete_user(&self, id: Uuid) -> Result<()> {
        UserStore::new(&self.conn()).delete(id)
    }
}

impl SessionRepository for Database {
    fn insert_session(&self, session: &Session) -> Result<()> {
        SessionStore::new(&self.conn()).create(session)
    }

    fn find_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        SessionStore::new(&self.conn()).find_by_token(token)
    }

    fn delete_session(&self, token: &str) -> Result<()> {
        SessionStore::new(&self.conn()).delete_by_token(token)
    }

    fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64> {
        SessionStore::new(&self.conn()).delete_for_user(user_id)
    }

    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        SessionStore::new(&self.conn()).delete_expired(now)
    }
}

impl TransactionRepository for Database {
    fn insert_transaction(&self, tx: &Transaction) -> Result<()> {
        TransactionStore::new(&self.conn()).create(tx)
    }

    fn find_transaction(&self, user_id: Uuid, id: Uuid) -> Result<Option<Transaction>> {
        TransactionStore::new(&self.conn()).find(user_id, id)
    }

    fn list_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        TransactionStore::new(&self.conn()).list(user_id, filter)
    }

    fn update_transaction(&self, tx: &Transaction) -> Result<bool> {
        TransactionStore::new(&self.conn()).update(tx)
    }

    fn delete_transaction(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        TransactionStore::new(&self.conn()).delete(user_id, id)
    }
}

impl DebtRepository for Database {
    fn insert_debt(&self, debt: &Debt) -> Result<()> {
        DebtStore::new(&self.conn()).create(debt)
    }

    fn find_debt(&self, user_id: Uuid, id: Uuid) -> Result<Option<Debt>> {
        DebtStore::new(&self.conn()).find(user_id, id)
    }

    fn list_debts(&self, user_id: Uuid) -> Result<Vec<Debt>> {
        DebtStore::new(&self.conn()).list(user_id)
    }

    fn record_debt_payment(
        &self,
        debt: &Debt,
        expected_remaining: i64,
        payment: &Transaction,
    ) -> Result<bool> {
        DebtStore::new(&self.conn()).record_payment(debt, expected_remaining, payment)
    }

    fn delete_debt(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        DebtStore::new(&self.conn()).delete(user_id, id)
    }
}

impl SavingsRepository for Database {
    fn insert_savings_goal(&self, goal: &SavingsGoal) -> Result<()> {
        SavingsStore::new(&self.conn()).create(goal)
    }

    fn find_savings_goal(&self, user_id: Uuid, id: Uuid) -> Result<Option<SavingsGoal>> {
        SavingsStore::new(&self.conn()).find(user_id, id)
    }

    fn list_savings_goals(&self, user_id: Uuid) -> Result<Vec<SavingsGoal>> {
        SavingsStore::new(&self.conn()).list(user_id)
    }

    fn replace_saved_cents(&self, goal: &SavingsGoal, expected_saved: i64) -> Result<bool> {
        SavingsStore::new(&self.conn()).replace_saved(goal, expected_saved)
    }

    fn delete_savings_goal(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        SavingsStore::new(&self.conn()).delete(user_id, id)
    }
}

impl BudgetRepository for Database {
    fn upsert_budget(&self, budget: &Budget) -> Result<Budget> {
        BudgetStore::new(&self.conn()).upsert(budget)
    }

    fn list_budgets(&self, user_id: Uuid, period: YearMonth) -> Result<Vec<Budget>> {
        BudgetStore::new(&self.conn()).list(user_id, period)
    }

    fn delete_budget(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        BudgetStore::new(&self.conn()).delete(user_id, id)
    }
}

impl SettingsRepository for Database {
    fn find_settings(&self, user_id: Uuid) -> Result<Option<Settings>> {
        SettingsStore::new(&self.conn()).load(user_id)
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        SettingsStore::new(&self.conn()).save(settings)
    }
}
