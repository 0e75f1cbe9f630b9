//! Application state shared across handlers.

use std::sync::Arc;

use oeiras_cloud::{
    Backends, ContentStore, EntityStore, IdentityProvider, ImageUploader, Mailer,
};
use oeiras_core::{AboutContent, Product};

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Every collaborator is built
/// at the composition root and injected here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backends: Backends,
    products: EntityStore<Product>,
    about: ContentStore<AboutContent>,
    identity: Arc<dyn IdentityProvider>,
    uploader: ImageUploader,
    mailer: Arc<dyn Mailer>,
}

/// Collaborators the storefront talks to.
pub struct Services {
    pub identity: Arc<dyn IdentityProvider>,
    pub uploader: ImageUploader,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create a new application state over the given backends.
    #[must_use]
    pub fn new(config: StorefrontConfig, backends: Backends, services: Services) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                products: EntityStore::new(backends.clone()),
                about: ContentStore::new(backends.clone()),
                config,
                backends,
                identity: services.identity,
                uploader: services.uploader,
                mailer: services.mailer,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The backend pair, for readiness checks.
    #[must_use]
    pub fn backends(&self) -> &Backends {
        &self.inner.backends
    }

    #[must_use]
    pub fn products(&self) -> &EntityStore<Product> {
        &self.inner.products
    }

    #[must_use]
    pub fn about(&self) -> &ContentStore<AboutContent> {
        &self.inner.about
    }

    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    #[must_use]
    pub fn uploader(&self) -> &ImageUploader {
        &self.inner.uploader
    }

    #[must_use]
    pub fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }
}
