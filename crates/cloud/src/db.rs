//! `PostgreSQL` pool and backend composition.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/cloud/migrations/` and run via:
//! ```bash
//! cargo run -p oeiras-cli -- migrate
//! ```

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;

use crate::config::StoreConfig;
use crate::store::{
    BackendError, Backends, DisconnectedBackend, JsonFileBackend, MemoryBackend, PostgresBackend,
    SharedBackend,
};

/// Create a lazily connecting pool, so an unreachable database at boot only
/// degrades requests instead of aborting startup.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string is malformed.
pub fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(database_url.expose_secret())
}

/// Apply the document store migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Build the primary/fallback pair from configuration.
///
/// Returns the pool as well when a database is configured, for the session
/// store.
///
/// # Errors
///
/// Returns `BackendError` if the database URL is malformed or the fallback
/// file cannot be loaded.
pub async fn build_backends(config: &StoreConfig) -> Result<(Backends, Option<PgPool>), BackendError> {
    let (primary, pool): (SharedBackend, Option<PgPool>) = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url)?;
            (Arc::new(PostgresBackend::new(pool.clone())), Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running on the fallback store only");
            (Arc::new(DisconnectedBackend), None)
        }
    };

    let fallback: SharedBackend = match &config.fallback_path {
        Some(path) => Arc::new(JsonFileBackend::open(path).await?),
        None => Arc::new(MemoryBackend::new()),
    };

    tracing::info!(
        primary = primary.backend_tag(),
        fallback = fallback.backend_tag(),
        "Document store ready"
    );
    Ok((Backends::new(primary, fallback), pool))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_database_builds_offline_pair() {
        let (backends, pool) = build_backends(&StoreConfig::default()).await.unwrap();
        assert!(pool.is_none());
        assert_eq!(backends.primary.backend_tag(), "disconnected");
        assert_eq!(backends.fallback.backend_tag(), "memory");
    }

    #[tokio::test]
    async fn test_fallback_path_selects_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            database_url: None,
            fallback_path: Some(dir.path().join("store.json")),
        };
        let (backends, _) = build_backends(&config).await.unwrap();
        assert_eq!(backends.fallback.backend_tag(), "json-file");
    }

    #[tokio::test]
    async fn test_lazy_pool_does_not_connect() {
        let url = SecretString::from("postgres://nobody@127.0.0.1:1/none");
        assert!(create_pool(&url).is_ok());
    }
}
