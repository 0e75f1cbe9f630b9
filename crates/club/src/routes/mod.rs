//! Route definitions for the club console.
//!
//! Everything under `/api` except sign-in answers JSON and sits behind the
//! admin gate.

pub mod auth;
pub mod email;
pub mod entities;

use axum::{
    Router,
    routing::{get, post},
};
use oeiras_core::{Coach, Coordinator, EntityId, Player};

use crate::state::AppState;

/// Parse a path segment into a record id.
#[must_use]
pub fn parse_id(raw: &str) -> EntityId {
    match raw.parse() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}

/// CRUD routes for one entity kind.
fn entity_routes<K: entities::ClubEntity>() -> Router<AppState> {
    Router::new()
        .route("/", get(entities::list::<K>).post(entities::create::<K>))
        .route(
            "/{id}",
            get(entities::show::<K>)
                .put(entities::update::<K>)
                .delete(entities::delete::<K>),
        )
}

/// Build the API router.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/new-password", post(auth::new_password))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .nest("/players", entity_routes::<Player>())
        .nest("/coaches", entity_routes::<Coach>())
        .nest("/coordinators", entity_routes::<Coordinator>())
        .route("/send-email", post(email::send));

    Router::new().nest("/api", api)
}
