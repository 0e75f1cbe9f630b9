//! Informational pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use oeiras_cloud::served;
use oeiras_core::AboutContent;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::cart::cart_item_count;
use crate::state::AppState;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub about: AboutContent,
    pub cart_item_count: u64,
}

/// Not found page template.
#[derive(Template, WebTemplate)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub cart_item_count: u64,
}

/// Display the about page. Always renders: the store falls back to the
/// built-in text when no edited copy is reachable.
#[instrument(skip(state, session))]
pub async fn about(State(state): State<AppState>, session: Session) -> AboutTemplate {
    AboutTemplate {
        about: served(state.about().get().await).content,
        cart_item_count: cart_item_count(&session).await,
    }
}

/// 404 response with the shop layout.
#[must_use]
pub fn not_found_page(cart_item_count: u64) -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate { cart_item_count }).into_response()
}

/// Router fallback.
pub async fn not_found(session: Session) -> Response {
    not_found_page(cart_item_count(&session).await)
}
