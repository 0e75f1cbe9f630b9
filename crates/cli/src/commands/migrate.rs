//! Database migration command.
//!
//! Applies the document store migrations from `crates/cloud/migrations/`
//! (`documents`, `id_sequences`) and creates the `tower_sessions` table used
//! by both apps.

use oeiras_cloud::config::load_dotenv;
use oeiras_cloud::db;
use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, database_url};

/// Run every migration against `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    load_dotenv();
    let url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&url)?;

    tracing::info!("Running document store migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
