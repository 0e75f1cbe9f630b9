//! Integration test harness for the Oeiras apps.
//!
//! Both routers are driven in-process with `tower::ServiceExt::oneshot`,
//! an in-memory session store and fake collaborators, so no database,
//! identity pool or SMTP server is needed.
//!
//! # Test Categories
//!
//! - `storefront_*` - Shop pages, cart API, admin area
//! - `club_api` - Club console JSON API

pub mod client;
pub mod fakes;

use std::sync::Arc;

use oeiras_cloud::{Backends, ImageUploader};
use oeiras_core::{EntityId, Price, Product};
use tempfile::TempDir;
use tower_sessions::MemoryStore;

pub use client::{TestClient, body_json, body_text, location};
pub use fakes::{ADMIN_PASSWORD, FakeIdentity, RecordingMailer};

/// A storefront router with handles on its collaborators.
pub struct StorefrontHarness {
    pub client: TestClient,
    pub state: oeiras_storefront::state::AppState,
    pub mailer: Arc<RecordingMailer>,
    pub uploads: TempDir,
}

/// Build a storefront over `backends`.
///
/// # Panics
///
/// Panics if the uploads temp dir cannot be created.
#[must_use]
pub fn storefront(backends: Backends, mailer: RecordingMailer) -> StorefrontHarness {
    use oeiras_storefront::config::StorefrontConfig;
    use oeiras_storefront::state::{AppState, Services};

    let uploads = TempDir::new().expect("uploads dir");
    let mailer = Arc::new(mailer);
    let config = StorefrontConfig::local(uploads.path());
    let services = Services {
        identity: Arc::new(FakeIdentity),
        uploader: ImageUploader::local(uploads.path()),
        mailer: mailer.clone(),
    };
    let state = AppState::new(config, backends, services);
    let router = oeiras_storefront::app(state.clone(), MemoryStore::default());

    StorefrontHarness {
        client: TestClient::new(router, oeiras_storefront::middleware::session::SESSION_COOKIE_NAME),
        state,
        mailer,
        uploads,
    }
}

/// A club console router with handles on its collaborators.
pub struct ClubHarness {
    pub client: TestClient,
    pub state: oeiras_club::state::AppState,
    pub mailer: Arc<RecordingMailer>,
}

#[must_use]
pub fn club(backends: Backends, mailer: RecordingMailer) -> ClubHarness {
    use oeiras_club::config::ClubConfig;
    use oeiras_club::state::AppState;

    let mailer = Arc::new(mailer);
    let state = AppState::new(
        ClubConfig::local(),
        backends,
        Arc::new(FakeIdentity),
        mailer.clone(),
    );
    let router = oeiras_club::app(state.clone(), MemoryStore::default());

    ClubHarness {
        client: TestClient::new(router, oeiras_club::middleware::session::SESSION_COOKIE_NAME),
        state,
        mailer,
    }
}

/// A catalog product with one image.
#[must_use]
pub fn product(name: &str, cents: i64, category: Option<&str>) -> Product {
    let image = format!("/uploads/{}.jpg", name.to_lowercase().replace(' ', "-"));
    Product {
        name: name.to_string(),
        price: Price::from_cents(cents),
        image: image.clone(),
        images: vec![image],
        description: format!("{name}, thrown and glazed by hand."),
        product_details: String::new(),
        category: category.map(str::to_string),
    }
}

/// Store `fields` under integer id `id`.
///
/// # Panics
///
/// Panics if both backends refuse the write.
pub async fn seed_product(state: &oeiras_storefront::state::AppState, id: i64, fields: Product) {
    state
        .products()
        .create_with_id(EntityId::Seq(id), fields)
        .await
        .expect("seed product");
}
