//! Sign-in API.
//!
//! `POST /api/auth/login` either opens an admin session or, for accounts
//! created with a temporary password, answers the `NEW_PASSWORD_REQUIRED`
//! challenge that `POST /api/auth/new-password` completes.

use axum::{Json, extract::State};
use oeiras_cloud::{AuthOutcome, AuthenticatedUser};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

const INVALID_INPUT: &str = "Invalid input format";
const NOT_ADMIN: &str = "Access denied. Admin privileges required.";

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Challenge response body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub session: String,
}

/// Answer to a sign-in step.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Username 1-50 characters after trimming, password 1-100 characters.
fn well_formed(username: &str, password: &str) -> bool {
    let username = username.trim().chars().count();
    let password = password.chars().count();
    (1..=50).contains(&username) && (1..=100).contains(&password)
}

/// Turn a provider outcome into a response, opening the session on success.
async fn finish(state: &AppState, session: &Session, outcome: AuthOutcome) -> Result<Json<AuthResponse>> {
    let user: AuthenticatedUser = match outcome {
        AuthOutcome::Authenticated(user) => user,
        AuthOutcome::NewPasswordRequired { session: challenge } => {
            tracing::info!("New password required");
            return Ok(Json(AuthResponse {
                success: false,
                username: None,
                challenge: Some("NEW_PASSWORD_REQUIRED"),
                session: Some(challenge),
            }));
        }
        AuthOutcome::Rejected { reason } => {
            tracing::info!(reason = %reason, "Sign-in rejected");
            return Err(AppError::Unauthorized(reason));
        }
    };

    if !state.identity().is_privileged(&user) {
        tracing::warn!("Sign-in by non-admin user refused");
        return Err(AppError::Forbidden(NOT_ADMIN.to_string()));
    }

    let admin = CurrentAdmin::new(&user.username);
    set_current_admin(session, &admin).await?;
    set_sentry_user(&admin.username);
    tracing::info!("Admin signed in");

    Ok(Json(AuthResponse {
        success: true,
        username: Some(admin.username),
        challenge: None,
        session: None,
    }))
}

#[instrument(skip(state, session, request), fields(username = %request.username.trim()))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    if !well_formed(&request.username, &request.password) {
        return Err(AppError::BadRequest(INVALID_INPUT.to_string()));
    }

    let password = SecretString::from(request.password);
    let outcome = state
        .identity()
        .authenticate(request.username.trim(), &password)
        .await?;
    finish(&state, &session, outcome).await
}

/// Complete the `NEW_PASSWORD_REQUIRED` challenge.
#[instrument(skip(state, session, request), fields(username = %request.username.trim()))]
pub async fn new_password(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<NewPasswordRequest>,
) -> Result<Json<AuthResponse>> {
    if !well_formed(&request.username, &request.new_password) || request.session.is_empty() {
        return Err(AppError::BadRequest(INVALID_INPUT.to_string()));
    }

    let new_password = SecretString::from(request.new_password);
    let outcome = state
        .identity()
        .complete_new_password(request.username.trim(), &new_password, &request.session)
        .await?;
    finish(&state, &session, outcome).await
}

#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Json(json!({ "success": true })))
}

/// The signed-in admin.
pub async fn me(RequireAdmin(admin): RequireAdmin) -> Json<CurrentAdmin> {
    Json(admin)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_bounds() {
        assert!(well_formed("treinador", "pw"));
        assert!(!well_formed(" ", "pw"));
        assert!(!well_formed("treinador", &"p".repeat(101)));
    }

    #[test]
    fn test_challenge_response_shape() {
        let body = serde_json::to_value(AuthResponse {
            success: false,
            username: None,
            challenge: Some("NEW_PASSWORD_REQUIRED"),
            session: Some("abc".to_string()),
        })
        .unwrap();
        assert_eq!(body["challenge"], "NEW_PASSWORD_REQUIRED");
        assert_eq!(body["session"], "abc");
        assert!(body.get("username").is_none());
    }

    #[test]
    fn test_new_password_request_is_camel_case() {
        let request: NewPasswordRequest = serde_json::from_str(
            r#"{"username": "ana", "newPassword": "Segura#2024", "session": "s"}"#,
        )
        .unwrap();
        assert_eq!(request.new_password, "Segura#2024");
    }
}
