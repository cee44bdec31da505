//! Password hashing and the password strength policy applied at registration.

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Passwords rejected outright regardless of length.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "football",
    "baseball",
    "welcome1",
    "letmein1",
    "abc12345",
    "trustno1",
    "admin123",
    "passw0rd",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing (PHC) string.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// `Ok(true)` when `password` matches `hash`.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Hash(e.to_string())),
        }
    }
}

/// Every policy rule `password` breaks, as user-facing messages.
///
/// `username` and `email` feed the similarity rule: a password equal to either
/// the username or the email's local part is refused (case-insensitive).
pub fn password_policy_violations(password: &str, username: &str, email: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        violations.push("This password is entirely numeric.".to_string());
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        violations.push("This password is too common.".to_string());
    }

    let local_part = email.split('@').next().unwrap_or_default();
    let similar = [username, local_part]
        .iter()
        .any(|attr| !attr.is_empty() && attr.to_lowercase() == lowered);
    if similar {
        violations.push("The password is too similar to the username or email.".to_string());
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("correct horse battery").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse battery", &hash).unwrap());
        assert!(!hasher.verify("wrong horse battery", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let hasher = Argon2Hasher::new();
        assert_ne!(hasher.hash("s3cret-words").unwrap(), hasher.hash("s3cret-words").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let err = Argon2Hasher::new().verify("whatever", "plaintext").unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }

    #[test]
    fn strong_password_passes_policy() {
        assert!(password_policy_violations("blue-kettle-42", "alice", "alice@example.com").is_empty());
    }

    #[test]
    fn policy_reports_every_violation() {
        let violations = password_policy_violations("1234", "alice", "alice@example.com");
        assert_eq!(violations.len(), 2, "{violations:?}");

        let violations = password_policy_violations("Password", "alice", "alice@example.com");
        assert_eq!(violations, vec!["This password is too common.".to_string()]);
    }

    #[test]
    fn policy_rejects_username_and_email_lookalikes() {
        assert_eq!(password_policy_violations("AliceSmith", "alicesmith", "a@b.io").len(), 1);
        assert_eq!(password_policy_violations("writer2026", "bob", "writer2026@mail.io").len(), 1);
    }
}
