//! Cache keys

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;

/// Group of keys invalidated together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Profile,
    Settings,
    Transactions,
    Debts,
    Savings,
    Budgets,
    Summary,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Profile => "profile",
            Namespace::Settings => "settings",
            Namespace::Transactions => "transactions",
            Namespace::Debts => "debts",
            Namespace::Savings => "savings",
            Namespace::Budgets => "budgets",
            Namespace::Summary => "summary",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key for one memoized read.
///
/// Always carries the acting user, so two users can never share an entry.
/// Parameters are stored as their JSON encoding; serde emits struct fields
/// in declaration order, which keeps the key deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: Namespace,
    user_id: Uuid,
    params: String,
}

impl CacheKey {
    pub fn new<P: Serialize + ?Sized>(namespace: Namespace, user_id: Uuid, params: &P) -> Result<Self> {
        Ok(Self {
            namespace,
            user_id,
            params: serde_json::to_string(params)?,
        })
    }

    /// Key for a read that takes no parameters
    pub fn bare(namespace: Namespace, user_id: Uuid) -> Self {
        Self {
            namespace,
            user_id,
            params: "{}".to_string(),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.user_id, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionFilter, TransactionKind};

    #[test]
    fn test_same_inputs_same_key() {
        let user = Uuid::new_v4();
        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        };
        let a = CacheKey::new(Namespace::Transactions, user, &filter).unwrap();
        let b = CacheKey::new(Namespace::Transactions, user, &filter.clone()).unwrap();
        assert_eq!(a, b);
        assert_ne!(
            a,
            CacheKey::new(Namespace::Transactions, user, &TransactionFilter::default()).unwrap()
        );
    }

    #[test]
    fn test_key_includes_user() {
        let a = CacheKey::bare(Namespace::Profile, Uuid::new_v4());
        let b = CacheKey::bare(Namespace::Profile, Uuid::new_v4());
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_format() {
        let user = Uuid::nil();
        let key = CacheKey::bare(Namespace::Debts, user);
        assert_eq!(
            key.to_string(),
            "debts:00000000-0000-0000-0000-000000000000:{}"
        );
    }
}
