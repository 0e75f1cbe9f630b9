//! Seed catalog products from a YAML file.
//!
//! ```yaml
//! products:
//!   - id: 1
//!     name: Taça de Chá
//!     price: "25.99"
//!     image: /uploads/taca.jpg
//!     description: Stoneware tea bowl with a celadon glaze.
//!     category: Bowls
//! ```
//!
//! Records go through the entity store, so they are validated exactly like
//! admin submissions. Products without an `id` get the next sequence value.

use std::path::Path;
use std::sync::Arc;

use oeiras_cloud::config::load_dotenv;
use oeiras_cloud::store::{DisconnectedBackend, PostgresBackend};
use oeiras_cloud::{Backends, EntityStore, db};
use oeiras_core::{EntityId, Product};
use serde::Deserialize;
use tracing::info;

use super::{CommandError, database_url};

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub product: Product,
}

/// Parse a seed file body.
///
/// # Errors
///
/// Returns error if the YAML does not describe a product list.
pub fn parse(content: &str) -> Result<SeedFile, CommandError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Load products from `path` into the document store.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the database is
/// unreachable, or any product fails validation.
pub async fn products(path: &Path, skip_existing: bool) -> Result<(), CommandError> {
    load_dotenv();

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let seed = parse(&content)?;
    info!(path = %path.display(), products = seed.products.len(), "Parsed seed file");

    // Validate everything before writing anything
    for (index, entry) in seed.products.iter().enumerate() {
        oeiras_core::EntityKind::validate(&entry.product)
            .map_err(|e| CommandError::Seed(format!("product #{}: {e}", index + 1)))?;
    }

    // No fallback: a write that misses the database must fail the seed
    let pool = db::create_pool(&database_url()?)?;
    let backends = Backends::new(
        Arc::new(PostgresBackend::new(pool)),
        Arc::new(DisconnectedBackend),
    );
    backends.primary.ping().await?;

    let store: EntityStore<Product> = EntityStore::new(backends);
    let mut inserted = 0_usize;
    let mut skipped = 0_usize;

    for entry in seed.products {
        match entry.id {
            Some(id) => {
                let id = EntityId::Seq(id);
                if skip_existing && store.get_by_id(&id).await.is_ok_and(|found| found.is_some()) {
                    skipped += 1;
                    continue;
                }
                store.create_with_id(id, entry.product).await?;
            }
            None => {
                store.create(entry.product).await?;
            }
        }
        inserted += 1;
    }

    info!(inserted, skipped, "Seeding complete!");
    Ok(())
}
