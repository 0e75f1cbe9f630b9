//! Command implementations.

pub mod migrate;
pub mod seed;

use oeiras_cloud::config::{ConfigError, get_required_env};
use oeiras_cloud::{BackendError, StoreError};
use secrecy::SecretString;
use thiserror::Error;

/// `DATABASE_URL`, required by every command.
fn database_url() -> Result<SecretString, ConfigError> {
    get_required_env("DATABASE_URL").map(SecretString::from)
}

/// Errors from any command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Seed(String),
}
