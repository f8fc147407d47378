//! Storage repository traits
//!
//! These traits define the persistence interface, allowing for different
//! implementations (SQLite, mock, future remote backend). Every finance
//! query takes the owning user id; callers pass the id resolved from a
//! session, never one taken from client input.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Budget, Debt, ProfileUpdate, SavingsGoal, Session, Settings, Transaction, TransactionFilter,
    User, YearMonth,
};

/// User account operations
pub trait UserRepository {
    /// Insert a new user. Fails with `DuplicateUsername` if the name is taken.
    fn insert_user(&self, user: &User) -> Result<()>;

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Exact match on the stored (normalized) username
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Apply a profile patch and return the updated account
    fn update_user(&self, id: Uuid, patch: &ProfileUpdate, now: DateTime<Utc>) -> Result<User>;

    /// Swap the password hash only if it still equals `expected_hash`.
    ///
    /// Returns false when the hash changed underneath the caller.
    fn replace_password_hash(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    fn update_last_login(&self, id: Uuid, now: DateTime<Utc>) -> Result<()>;

    /// Delete the account and, by cascade, everything it owns
    fn delete_user(&self, id: Uuid) -> Result<()>;
}

/// Session operations
pub trait SessionRepository {
    fn insert_session(&self, session: &Session) -> Result<()>;

    /// Look up by token regardless of expiry
    fn find_session_by_token(&self, token: &str) -> Result<Option<Session>>;

    /// Delete by token. Deleting a missing session is not an error.
    fn delete_session(&self, token: &str) -> Result<()>;

    fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64>;

    /// Delete every session with `expires_at <= now`
    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64>;
}

pub trait TransactionRepository {
    fn insert_transaction(&self, tx: &Transaction) -> Result<()>;

    fn find_transaction(&self, user_id: Uuid, id: Uuid) -> Result<Option<Transaction>>;

    /// Newest first
    fn list_transactions(&self, user_id: Uuid, filter: &TransactionFilter)
        -> Result<Vec<Transaction>>;

    /// Returns false if no row owned by `tx.user_id` matched
    fn update_transaction(&self, tx: &Transaction) -> Result<bool>;

    fn delete_transaction(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

pub trait DebtRepository {
    fn insert_debt(&self, debt: &Debt) -> Result<()>;

    fn find_debt(&self, user_id: Uuid, id: Uuid) -> Result<Option<Debt>>;

    fn list_debts(&self, user_id: Uuid) -> Result<Vec<Debt>>;

    /// Persist a paid-down debt and the matching expense in one unit.
    ///
    /// Writes nothing and returns false unless the stored balance still
    /// equals `expected_remaining`.
    fn record_debt_payment(
        &self,
        debt: &Debt,
        expected_remaining: i64,
        payment: &Transaction,
    ) -> Result<bool>;

    fn delete_debt(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

pub trait SavingsRepository {
    fn insert_savings_goal(&self, goal: &SavingsGoal) -> Result<()>;

    fn find_savings_goal(&self, user_id: Uuid, id: Uuid) -> Result<Option<SavingsGoal>>;

    fn list_savings_goals(&self, user_id: Uuid) -> Result<Vec<SavingsGoal>>;

    /// Swap in `goal.saved_cents` only if the stored amount is still
    /// `expected_saved`
    fn replace_saved_cents(&self, goal: &SavingsGoal, expected_saved: i64) -> Result<bool>;

    fn delete_savings_goal(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

pub trait BudgetRepository {
    /// Insert, or replace the limit of the existing (category, period) budget
    fn upsert_budget(&self, budget: &Budget) -> Result<Budget>;

    fn list_budgets(&self, user_id: Uuid, period: YearMonth) -> Result<Vec<Budget>>;

    fn delete_budget(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

pub trait SettingsRepository {
    fn find_settings(&self, user_id: Uuid) -> Result<Option<Settings>>;

    fn save_settings(&self, settings: &Settings) -> Result<()>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite, mocks, or network.
pub trait Storage:
    UserRepository
    + SessionRepository
    + TransactionRepository
    + DebtRepository
    + SavingsRepository
    + BudgetRepository
    + SettingsRepository
{
}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where
    T: UserRepository
        + SessionRepository
        + TransactionRepository
        + DebtRepository
        + SavingsRepository
        + BudgetRepository
        + SettingsRepository
{
}
