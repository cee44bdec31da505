//! `scribe-auth`: user accounts, passwords and bearer tokens.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod jwt;
pub mod password;
pub mod user;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, Hs256TokenIssuer, IssuedToken, JwtValidator, TokenError, TokenIssuer};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher, password_policy_violations};
pub use user::{Email, RegisterUser, User, UserProfile, Username, ValidRegistration};
