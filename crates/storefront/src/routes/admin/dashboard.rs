//! Admin dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::Redirect};
use tracing::instrument;

use crate::middleware::RequireAdmin;
use crate::routes::admin::DASHBOARD_PATH;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub username: String,
    pub products: Vec<ProductView>,
    /// The catalog came from the fallback store.
    pub degraded: bool,
}

/// List every product with edit and delete actions.
#[instrument(skip(state, admin), fields(username = %admin.username))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> DashboardTemplate {
    let (products, degraded) = match state.products().get_all().await {
        Ok(products) => (products, false),
        Err(degraded) => (degraded.value, true),
    };

    DashboardTemplate {
        username: admin.username,
        products: products.iter().map(ProductView::from).collect(),
        degraded,
    }
}

/// `/admin` and the legacy `/dashboard` path.
pub async fn redirect(RequireAdmin(_admin): RequireAdmin) -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}
