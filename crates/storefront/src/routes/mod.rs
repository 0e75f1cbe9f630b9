//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                          - Home page (first three pieces)
//! GET    /products?category=        - Product listing
//! GET    /product/{id}              - Product detail
//! GET    /about                     - About page
//! GET    /contact                   - Contact form
//! POST   /contact                   - Send contact message
//!
//! # Cart (JSON API used by static/js/cart.js)
//! GET    /cart                      - Cart page
//! POST   /cart/add                  - {productId, quantity?}
//! PUT    /cart/update               - {productId, quantity}
//! DELETE /cart/remove/{id}          - Remove a line
//! DELETE /cart/clear                - Empty the cart
//! GET    /cart/data                 - Cart snapshot
//! GET    /checkout                  - Checkout placeholder
//!
//! # Admin (session-gated, redirects to /admin/login)
//! GET    /admin/login               - Login page
//! POST   /admin/login               - Login action
//! POST   /admin/logout              - Logout action
//! GET    /admin/dashboard           - Product list
//! GET    /admin/products/add        - Add form
//! POST   /admin/products            - Create (multipart, JSON response)
//! GET    /admin/products/{id}/edit  - Edit form
//! POST   /admin/products/{id}       - Update (multipart)
//! DELETE /admin/products/{id}       - Delete (JSON response)
//! GET    /admin/about/edit          - About editor
//! POST   /admin/about/update        - Save about page
//! ```

pub mod admin;
pub mod cart;
pub mod contact;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use oeiras_core::EntityId;

use crate::state::AppState;

pub use pages::not_found;

/// Parse an id from a path segment or form value.
#[must_use]
pub fn parse_id(raw: &str) -> EntityId {
    match raw.parse() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", put(cart::update))
        .route("/remove/{id}", delete(cart::remove))
        .route("/clear", delete(cart::clear))
        .route("/data", get(cart::data))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/product/{id}", get(products::show))
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout))
        .route("/about", get(pages::about))
        .route("/contact", get(contact::show).post(contact::submit))
        .nest("/admin", admin::routes())
        // Legacy path from the first version of the admin area
        .route("/dashboard", get(admin::dashboard::redirect))
}
