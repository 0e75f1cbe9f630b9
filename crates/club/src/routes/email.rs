//! Admin notification email.

use axum::{Json, extract::State};
use oeiras_cloud::OutgoingEmail;
use oeiras_core::{Email, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl SendEmailRequest {
    /// Build the plain text message.
    fn into_email(self) -> std::result::Result<OutgoingEmail, ValidationError> {
        let to = Email::parse(self.email.trim())
            .map_err(|_| ValidationError::invalid("email", "a valid email address"))?;
        oeiras_core::entity::require_text("subject", &self.subject)?;
        oeiras_core::entity::require_text("message", &self.message)?;
        Ok(OutgoingEmail {
            to: to.to_string(),
            reply_to: None,
            subject: self.subject.trim().to_string(),
            text_body: self.message,
            html_body: None,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub message_id: String,
    pub message: &'static str,
}

/// Send a notification. Transport failures answer 502.
#[instrument(skip(state, admin, request), fields(username = %admin.username))]
pub async fn send(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>> {
    let email = request.into_email()?;
    let message_id = state.mailer().send(&email).await?;
    tracing::info!(message_id = %message_id, "Notification sent");
    Ok(Json(SendEmailResponse {
        success: true,
        message_id,
        message: "Email sent successfully",
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(email: &str, subject: &str, message: &str) -> SendEmailRequest {
        SendEmailRequest {
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_into_email_is_text_only() {
        let email = request("pais@example.pt", " Treino ", "Sábado às 10h").into_email().unwrap();
        assert_eq!(email.to, "pais@example.pt");
        assert_eq!(email.subject, "Treino");
        assert!(email.html_body.is_none());
    }

    #[test]
    fn test_into_email_validates() {
        assert_eq!(
            request("nope", "s", "m").into_email().unwrap_err(),
            ValidationError::invalid("email", "a valid email address")
        );
        assert_eq!(
            request("a@b.pt", "", "m").into_email().unwrap_err(),
            ValidationError::Required("subject")
        );
    }
}
