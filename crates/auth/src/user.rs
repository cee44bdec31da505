//! User accounts: identity fields, registration rules and the public profile view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scribe_core::{DomainError, DomainResult, Entity, FieldErrors, UserId, ValueObject};

use crate::password::password_policy_violations;

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_NAME_LENGTH: usize = 150;
pub const MAX_EMAIL_LENGTH: usize = 254;

const REQUIRED: &str = "This field is required.";

// -------------------------
// Value objects
// -------------------------

/// Login name: letters, digits and `@.+-_`, at most 150 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if raw.is_empty() {
            return Err(DomainError::validation("username", REQUIRED));
        }
        if raw.chars().count() > MAX_USERNAME_LENGTH {
            return Err(DomainError::validation(
                "username",
                format!("Ensure this field has no more than {MAX_USERNAME_LENGTH} characters."),
            ));
        }
        let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
        if !raw.chars().all(allowed) {
            return Err(DomainError::validation(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Username {}

impl core::fmt::Display for Username {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contact address, normalized to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("email", REQUIRED));
        }
        if trimmed.len() > MAX_EMAIL_LENGTH || !looks_like_email(trimmed) {
            return Err(DomainError::validation("email", "Enter a valid email address."));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

impl ValueObject for Email {}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

// -------------------------
// User
// -------------------------

/// A registered account.
///
/// `password_hash` is a PHC string; it is deliberately absent from
/// [`UserProfile`], the only shape that leaves the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Build the account for an already-validated registration.
    pub fn register(id: UserId, registration: ValidRegistration, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username: registration.username,
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
            password_hash,
            date_joined: now,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.as_str().to_string(),
            email: self.email.as_str().to_string(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Public profile fields of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

// -------------------------
// Registration
// -------------------------

/// Submitted sign-up form.
///
/// Every field defaults to empty so missing input surfaces as a per-field
/// "required" message instead of a body-level parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
}

/// Registration that passed every field rule; the password is still plaintext.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub username: Username,
    pub email: Email,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterUser {
    /// Check every field and report all failures together.
    ///
    /// Uniqueness of username/email is not checked here; that belongs to the store.
    pub fn validate(self) -> DomainResult<ValidRegistration> {
        let mut errors = FieldErrors::new();

        let username = collect(&mut errors, Username::parse(&self.username));
        let email = collect(&mut errors, Email::parse(&self.email));

        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        } else {
            let local_part = email.as_ref().map(Email::local_part).unwrap_or_default();
            for violation in password_policy_violations(&self.password, &self.username, local_part) {
                errors.add("password", violation);
            }
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password != self.password2 {
            errors.add("password", "Password fields didn't match.");
        }

        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.chars().count() > MAX_NAME_LENGTH {
                errors.add(field, format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."));
            }
        }

        errors.into_result()?;

        match (username, email) {
            (Some(username), Some(email)) => Ok(ValidRegistration {
                username,
                email,
                password: self.password,
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
            }),
            // Unreachable in practice: a failed parse always records a field error.
            _ => Err(DomainError::validation("non_field_errors", "invalid registration")),
        }
    }
}

fn collect<T>(errors: &mut FieldErrors, result: DomainResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(DomainError::Validation(field_errors)) => {
            errors.merge(field_errors);
            None
        }
        Err(other) => {
            errors.add("non_field_errors", other.to_string());
            None
        }
    }
}
