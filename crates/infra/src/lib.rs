//! Infrastructure layer: configuration, database wiring and the user/post stores.

pub mod config;
pub mod db;
pub mod store;

pub use config::{AppConfig, ConfigError};
