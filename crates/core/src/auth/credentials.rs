//! Username normalization, password policy, and password hashing
//!
//! There is exactly one way to check a password: [`verify_password`], which
//! goes through argon2's constant-time comparison.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MAX_USERNAME_LEN: usize = 64;
const MAX_FULL_NAME_LEN: usize = 100;

/// Well-formed hash with default argon2 parameters that matches no password.
/// Verified against when a username is unknown so both failure paths cost
/// the same.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$hL4xOGfrmRcGlsbDNuWTMQ$/ZTJsViiUgg6VW/43/Ifce3V6omYyUz7hv4zHXgOZck";

/// Canonical form used for both uniqueness and lookups: trimmed, lower-case
pub fn normalize_username(raw: &str) -> Result<String> {
    let username = raw.trim().to_lowercase();
    if username.is_empty() {
        return Err(Error::validation("username", "must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(Error::validation(
            "username",
            format!("must be at most {} characters", MAX_USERNAME_LEN),
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(Error::validation("username", "must not contain spaces"));
    }
    Ok(username)
}

pub fn validate_full_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::validation("full name", "must not be empty"));
    }
    if name.chars().count() > MAX_FULL_NAME_LEN {
        return Err(Error::validation(
            "full name",
            format!("must be at most {} characters", MAX_FULL_NAME_LEN),
        ));
    }
    Ok(name.to_string())
}

/// Minimum password strength
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_mixed_case: bool,
    pub require_digit: bool,
    pub require_symbol: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_mixed_case: true,
            require_digit: true,
            require_symbol: true,
        }
    }
}

impl PasswordPolicy {
    /// Reports the first unmet rule
    pub fn check(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_length {
            return Err(Error::WeakPassword(format!(
                "must be at least {} characters",
                self.min_length
            )));
        }
        if self.require_mixed_case
            && !(password.chars().any(char::is_uppercase)
                && password.chars().any(char::is_lowercase))
        {
            return Err(Error::WeakPassword(
                "must mix upper and lower case letters".into(),
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(Error::WeakPassword("must contain a digit".into()));
        }
        if self.require_symbol && password.chars().all(char::is_alphanumeric) {
            return Err(Error::WeakPassword("must contain a symbol".into()));
        }
        Ok(())
    }
}

/// Hash with argon2id and a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// True only if `password` matches `stored_hash`. A malformed stored hash
/// never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => {
            tracing::warn!("Stored password hash is malformed");
            false
        }
    }
}

/// Burn one verification against [`DUMMY_HASH`]; always false
pub(crate) fn verify_against_dummy(password: &str) -> bool {
    let _ = verify_password(password, DUMMY_HASH);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Alice ").unwrap(), "alice");
        assert!(normalize_username("   ").is_err());
        assert!(normalize_username("two words").is_err());
        assert!(normalize_username(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_policy_rules() {
        let policy = PasswordPolicy::default();
        assert!(policy.check("Secret123!").is_ok());

        for weak in ["Sh0rt!", "secret123!", "SECRET123!", "Secretttt!", "Secret1234"] {
            assert!(
                matches!(policy.check(weak), Err(Error::WeakPassword(_))),
                "{} should be rejected",
                weak
            );
        }
    }

    #[test]
    fn test_relaxed_policy() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_mixed_case: false,
            require_digit: false,
            require_symbol: false,
        };
        assert!(policy.check("abcd").is_ok());
        assert!(policy.check("abc").is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret123!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Secret123!"));
        assert!(verify_password("Secret123!", &hash));
        assert!(!verify_password("secret123!", &hash));

        // Salted: same password, different hash
        assert_ne!(hash, hash_password("Secret123!").unwrap());
    }

    #[test]
    fn test_dummy_hash_is_parseable_and_never_matches() {
        assert!(PasswordHash::new(DUMMY_HASH).is_ok());
        assert!(!verify_against_dummy("Secret123!"));
        assert!(!verify_password("anything", "not-a-hash"));
    }
}
