//! About page editor.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use oeiras_cloud::{StoreError, served};
use oeiras_core::AboutContent;
use tracing::instrument;

use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// About editor template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/about_edit.html")]
pub struct AboutEditTemplate {
    pub username: String,
    pub about: AboutContent,
    pub error: Option<String>,
    pub success: bool,
}

/// Display the editor with the text currently served.
#[instrument(skip(state, admin), fields(username = %admin.username))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AboutEditTemplate {
    AboutEditTemplate {
        username: admin.username,
        about: served(state.about().get().await).content,
        error: None,
        success: false,
    }
}

/// Save the edited text.
///
/// A write that only reached the fallback store still reports success: the
/// edit is what the about page now serves.
#[instrument(skip(state, admin, form), fields(username = %admin.username))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<AboutContent>,
) -> AboutEditTemplate {
    let (about, error) = match state.about().put(form.clone()).await {
        Ok(Ok(record)) => {
            tracing::info!("About page updated");
            (record.content, None)
        }
        Ok(Err(degraded)) => {
            tracing::warn!(cause = %degraded.cause, "About page saved to fallback store only");
            (degraded.value.content, None)
        }
        Err(StoreError::Validation(e)) => {
            tracing::debug!(error = %e, "About page edit rejected");
            (form, Some("All fields are required".to_string()))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update about page");
            (form, Some("Failed to update about page".to_string()))
        }
    };

    AboutEditTemplate {
        username: admin.username,
        success: error.is_none(),
        about,
        error,
    }
}
