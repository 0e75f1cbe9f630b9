//! Admin sign-in and sign-out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use oeiras_cloud::AuthOutcome;
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::routes::admin::DASHBOARD_PATH;
use crate::state::AppState;

const INVALID_INPUT: &str = "Invalid input format";
const NOT_ADMIN: &str = "Access denied. Admin privileges required.";
const AUTH_FAILED: &str = "Authentication failed. Please check your credentials.";

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Username 1-50 characters after trimming, password 1-100 characters.
    fn is_well_formed(&self) -> bool {
        let username = self.username.trim().chars().count();
        let password = self.password.chars().count();
        (1..=50).contains(&username) && (1..=100).contains(&password)
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

fn login_error(message: impl Into<String>) -> Response {
    LoginTemplate {
        error: Some(message.into()),
    }
    .into_response()
}

/// Display the login page, or go straight to the dashboard when signed in.
pub async fn login_page(OptionalAdmin(admin): OptionalAdmin) -> Response {
    if admin.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    LoginTemplate { error: None }.into_response()
}

/// Check credentials with the identity provider and open an admin session.
#[instrument(skip(state, session, form), fields(username = %form.username.trim()))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if !form.is_well_formed() {
        return login_error(INVALID_INPUT);
    }

    let username = form.username.trim();
    let password = SecretString::from(form.password);

    let user = match state.identity().authenticate(username, &password).await {
        Ok(AuthOutcome::Authenticated(user)) => user,
        Ok(AuthOutcome::NewPasswordRequired { .. }) => {
            tracing::warn!("Admin account still has a temporary password");
            return login_error("Authentication failed");
        }
        Ok(AuthOutcome::Rejected { reason }) => {
            tracing::info!(reason = %reason, "Admin login rejected");
            return login_error(reason);
        }
        Err(e) => {
            tracing::error!(error = %e, "Identity provider error during login");
            return login_error(AUTH_FAILED);
        }
    };

    if !state.identity().is_privileged(&user) {
        tracing::warn!("Login by non-admin user refused");
        return login_error(NOT_ADMIN);
    }

    let admin = CurrentAdmin::new(&user.username);
    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!(error = %e, "Failed to store admin session");
        return login_error(AUTH_FAILED);
    }

    set_sentry_user(&admin.username);
    tracing::info!("Admin signed in");
    Redirect::to(DASHBOARD_PATH).into_response()
}

/// End the admin session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!(error = %e, "Failed to clear admin session");
    }
    clear_sentry_user();
    Redirect::to(crate::middleware::LOGIN_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str) -> LoginForm {
        LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_form_bounds() {
        assert!(form("agatha", "pw").is_well_formed());
        assert!(!form("   ", "pw").is_well_formed());
        assert!(!form("agatha", "").is_well_formed());
        assert!(!form(&"a".repeat(51), "pw").is_well_formed());
        assert!(form(&"a".repeat(50), &"p".repeat(100)).is_well_formed());
        assert!(!form("agatha", &"p".repeat(101)).is_well_formed());
    }
}
