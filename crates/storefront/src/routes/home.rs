//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use oeiras_cloud::served;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::cart::cart_item_count;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Number of pieces shown on the home page.
const FEATURED_COUNT: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductView>,
    pub cart_item_count: u64,
}

/// Display the home page with the first few catalog pieces.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> HomeTemplate {
    let products = served(state.products().get_all().await);
    HomeTemplate {
        featured: products
            .iter()
            .take(FEATURED_COUNT)
            .map(ProductView::from)
            .collect(),
        cart_item_count: cart_item_count(&session).await,
    }
}
