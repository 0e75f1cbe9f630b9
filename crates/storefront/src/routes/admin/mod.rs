//! Admin area: sign-in, catalog management and the about page editor.
//!
//! Every handler except the login pages takes
//! [`RequireAdmin`](crate::middleware::RequireAdmin).

pub mod about;
pub mod auth;
pub mod dashboard;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use oeiras_cloud::storage::{MAX_FILE_BYTES, MAX_FILES};

use crate::state::AppState;

/// Landing page after sign-in.
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Room for a full image batch plus the text fields.
const UPLOAD_BODY_LIMIT: usize = MAX_FILES * MAX_FILE_BYTES + 1024 * 1024;

/// Create the admin routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::redirect))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::show))
        .route("/products", post(products::create))
        .route("/products/add", get(products::add_page))
        .route(
            "/products/{id}",
            post(products::update).delete(products::delete),
        )
        .route("/products/{id}/edit", get(products::edit_page))
        .route("/about/edit", get(about::edit_page))
        .route("/about/update", post(about::update))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}
