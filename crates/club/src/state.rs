//! Application state shared across handlers.

use std::sync::Arc;

use oeiras_cloud::{Backends, EntityStore, IdentityProvider, Mailer};
use oeiras_core::{Coach, Coordinator, Player};

use crate::config::ClubConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; collaborators are built in `main` and
/// injected here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClubConfig,
    backends: Backends,
    players: EntityStore<Player>,
    coaches: EntityStore<Coach>,
    coordinators: EntityStore<Coordinator>,
    identity: Arc<dyn IdentityProvider>,
    mailer: Arc<dyn Mailer>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: ClubConfig,
        backends: Backends,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                players: EntityStore::new(backends.clone()),
                coaches: EntityStore::new(backends.clone()),
                coordinators: EntityStore::new(backends.clone()),
                config,
                backends,
                identity,
                mailer,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClubConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backends(&self) -> &Backends {
        &self.inner.backends
    }

    #[must_use]
    pub fn players(&self) -> &EntityStore<Player> {
        &self.inner.players
    }

    #[must_use]
    pub fn coaches(&self) -> &EntityStore<Coach> {
        &self.inner.coaches
    }

    #[must_use]
    pub fn coordinators(&self) -> &EntityStore<Coordinator> {
        &self.inner.coordinators
    }

    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    #[must_use]
    pub fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }
}
