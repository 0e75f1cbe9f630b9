//! Admin authentication against a Cognito user pool.
//!
//! Talks to the user-pool JSON API directly (`InitiateAuth` with
//! `USER_PASSWORD_AUTH`, `RespondToAuthChallenge` for
//! `NEW_PASSWORD_REQUIRED`). The ID token in a successful response is only
//! decoded for its claims; it arrives over TLS straight from the provider and
//! is never accepted from a browser.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Sha256;
use thiserror::Error;
use tracing::instrument;

use crate::config::CognitoConfig;

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// Errors talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider error: {status} {kind} - {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("unexpected identity provider response: {0}")]
    Parse(String),
}

/// A user the provider has just authenticated.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub username: String,
    pub email: Option<String>,
    pub groups: Vec<String>,
    pub access_token: SecretString,
}

impl std::fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("groups", &self.groups)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Result of a sign-in step.
#[derive(Debug)]
pub enum AuthOutcome {
    Authenticated(AuthenticatedUser),
    /// First sign-in with a temporary password; call
    /// [`IdentityProvider::complete_new_password`] with this session.
    NewPasswordRequired { session: String },
    /// Credentials refused. `reason` is safe to show to the user.
    Rejected { reason: String },
}

/// The identity provider seam.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check a username and password.
    async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthOutcome, IdentityError>;

    /// Answer a `NEW_PASSWORD_REQUIRED` challenge.
    async fn complete_new_password(
        &self,
        username: &str,
        new_password: &SecretString,
        session: &str,
    ) -> Result<AuthOutcome, IdentityError>;

    /// Whether this user may use the admin areas.
    fn is_privileged(&self, user: &AuthenticatedUser) -> bool;
}

/// Provider used when no user pool is configured: every sign-in is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredIdentity;

const UNCONFIGURED_REASON: &str = "Sign-in is not available: identity provider not configured";

#[async_trait]
impl IdentityProvider for UnconfiguredIdentity {
    async fn authenticate(
        &self,
        username: &str,
        _password: &SecretString,
    ) -> Result<AuthOutcome, IdentityError> {
        tracing::warn!(username, "Login attempted without an identity provider");
        Ok(AuthOutcome::Rejected {
            reason: UNCONFIGURED_REASON.to_string(),
        })
    }

    async fn complete_new_password(
        &self,
        _username: &str,
        _new_password: &SecretString,
        _session: &str,
    ) -> Result<AuthOutcome, IdentityError> {
        Ok(AuthOutcome::Rejected {
            reason: UNCONFIGURED_REASON.to_string(),
        })
    }

    fn is_privileged(&self, _user: &AuthenticatedUser) -> bool {
        false
    }
}

/// Cognito user-pool client.
#[derive(Clone)]
pub struct CognitoClient {
    client: reqwest::Client,
    endpoint: String,
    client_id: String,
    client_secret: Option<SecretString>,
    admin_group: Option<String>,
}

impl CognitoClient {
    /// Create a client for the configured user pool.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CognitoConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(AMZ_JSON));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            admin_group: config.admin_group.clone(),
        })
    }

    fn secret_hash(&self, username: &str) -> Option<String> {
        self.client_secret
            .as_ref()
            .map(|secret| secret_hash(secret.expose_secret(), username, &self.client_id))
    }

    async fn call(&self, action: &str, body: Value) -> Result<(u16, Value), IdentityError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .body(body.to_string())
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| IdentityError::Parse(e.to_string()))?
        };
        Ok((status, value))
    }
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    #[instrument(skip(self, password))]
    async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthOutcome, IdentityError> {
        let mut params = json!({
            "USERNAME": username,
            "PASSWORD": password.expose_secret(),
        });
        if let Some(hash) = self.secret_hash(username) {
            params["SECRET_HASH"] = Value::String(hash);
        }
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": params,
        });

        let (status, response) = self.call("InitiateAuth", body).await?;
        interpret(status, &response, username)
    }

    #[instrument(skip(self, new_password, session))]
    async fn complete_new_password(
        &self,
        username: &str,
        new_password: &SecretString,
        session: &str,
    ) -> Result<AuthOutcome, IdentityError> {
        let mut responses = json!({
            "USERNAME": username,
            "NEW_PASSWORD": new_password.expose_secret(),
        });
        if let Some(hash) = self.secret_hash(username) {
            responses["SECRET_HASH"] = Value::String(hash);
        }
        let body = json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "ClientId": self.client_id,
            "Session": session,
            "ChallengeResponses": responses,
        });

        let (status, response) = self.call("RespondToAuthChallenge", body).await?;
        interpret(status, &response, username)
    }

    fn is_privileged(&self, user: &AuthenticatedUser) -> bool {
        self.admin_group
            .as_deref()
            .is_none_or(|group| user.groups.iter().any(|g| g == group))
    }
}

/// The configured provider, or [`UnconfiguredIdentity`] without a user pool.
///
/// # Errors
///
/// Returns error if the HTTP client fails to build.
pub fn provider_from_config(
    config: Option<&CognitoConfig>,
) -> Result<std::sync::Arc<dyn IdentityProvider>, IdentityError> {
    Ok(match config {
        Some(config) => std::sync::Arc::new(CognitoClient::new(config)?),
        None => {
            tracing::warn!("COGNITO_CLIENT_ID not set, admin sign-in is disabled");
            std::sync::Arc::new(UnconfiguredIdentity)
        }
    })
}

/// `base64(HMAC-SHA256(client_secret, username + client_id))`.
#[must_use]
pub fn secret_hash(client_secret: &str, username: &str, client_id: &str) -> String {
    // HMAC accepts keys of any length
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(client_secret.as_bytes()) else {
        return String::new();
    };
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
    session: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: Option<String>,
}

#[derive(Deserialize, Default)]
struct IdTokenClaims {
    #[serde(rename = "cognito:username")]
    username: Option<String>,
    email: Option<String>,
    #[serde(rename = "cognito:groups", default)]
    groups: Vec<String>,
}

/// Map a provider response to an outcome.
fn interpret(status: u16, body: &Value, username: &str) -> Result<AuthOutcome, IdentityError> {
    if !(200..300).contains(&status) {
        let kind = body
            .get("__type")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .rsplit('#')
            .next()
            .unwrap_or("Unknown")
            .to_string();
        let message = body
            .get("message")
            .or_else(|| body.get("Message"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let reason = match kind.as_str() {
            "NotAuthorizedException" | "UserNotFoundException" => {
                "Invalid username or password".to_string()
            }
            "UserNotConfirmedException" => "Account is not confirmed yet".to_string(),
            "PasswordResetRequiredException" => "Password reset required".to_string(),
            "InvalidPasswordException" => message,
            _ => return Err(IdentityError::Api { status, kind, message }),
        };
        tracing::info!(username, kind = %kind, "Sign-in rejected");
        return Ok(AuthOutcome::Rejected { reason });
    }

    let response: AuthResponse =
        serde_json::from_value(body.clone()).map_err(|e| IdentityError::Parse(e.to_string()))?;

    if let Some(result) = response.authentication_result {
        let claims = result
            .id_token
            .as_deref()
            .and_then(decode_claims)
            .unwrap_or_default();
        return Ok(AuthOutcome::Authenticated(AuthenticatedUser {
            username: claims.username.unwrap_or_else(|| username.to_string()),
            email: claims.email,
            groups: claims.groups,
            access_token: SecretString::from(result.access_token),
        }));
    }

    match (response.challenge_name.as_deref(), response.session) {
        (Some("NEW_PASSWORD_REQUIRED"), Some(session)) => {
            Ok(AuthOutcome::NewPasswordRequired { session })
        }
        (Some(other), _) => Err(IdentityError::Parse(format!("unsupported challenge {other}"))),
        (None, _) => Err(IdentityError::Parse("no tokens and no challenge".to_string())),
    }
}

/// Decode the payload segment of a JWT without verifying it.
fn decode_claims(token: &str) -> Option<IdTokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CLAIMS: &str = "eyJjb2duaXRvOnVzZXJuYW1lIjoiYWdhdGhhIiwiY29nbml0bzpncm91cHMiOlsiYWRtaW5zIl0sImVtYWlsIjoiYWdhdGhhQGV4YW1wbGUucHQifQ";

    fn user(groups: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            username: "agatha".to_string(),
            email: None,
            groups: groups.iter().map(ToString::to_string).collect(),
            access_token: SecretString::from("token"),
        }
    }

    fn client(admin_group: Option<&str>) -> CognitoClient {
        CognitoClient::new(&CognitoConfig {
            region: "eu-west-1".to_string(),
            client_id: "client123".to_string(),
            client_secret: None,
            admin_group: admin_group.map(ToString::to_string),
            endpoint: None,
        })
        .unwrap()
    }

    #[test]
    fn test_secret_hash_matches_reference() {
        assert_eq!(
            secret_hash("k3y-s3cr3t", "agatha", "client123"),
            "hXxZ/B2zBoflKvxEB9tUZYGF2JvV+cl0AorcpazuuYM="
        );
    }

    #[test]
    fn test_interpret_tokens_reads_claims() {
        let body = json!({
            "AuthenticationResult": {
                "AccessToken": "access",
                "IdToken": format!("header.{CLAIMS}.signature"),
                "ExpiresIn": 3600,
                "TokenType": "Bearer"
            }
        });
        let AuthOutcome::Authenticated(user) = interpret(200, &body, "typed-name").unwrap() else {
            panic!("expected authenticated");
        };
        assert_eq!(user.username, "agatha");
        assert_eq!(user.groups, vec!["admins".to_string()]);
        assert_eq!(user.email.as_deref(), Some("agatha@example.pt"));
    }

    #[test]
    fn test_interpret_new_password_challenge() {
        let body = json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "Session": "sess-1",
            "ChallengeParameters": {}
        });
        assert!(matches!(
            interpret(200, &body, "agatha").unwrap(),
            AuthOutcome::NewPasswordRequired { session } if session == "sess-1"
        ));
    }

    #[test]
    fn test_interpret_wrong_password_is_rejection() {
        let body = json!({
            "__type": "NotAuthorizedException",
            "message": "Incorrect username or password."
        });
        assert!(matches!(
            interpret(400, &body, "agatha").unwrap(),
            AuthOutcome::Rejected { reason } if reason == "Invalid username or password"
        ));
    }

    #[test]
    fn test_interpret_service_failure_is_error() {
        let body = json!({"__type": "com.amazonaws#InternalErrorException", "message": "boom"});
        let err = interpret(500, &body, "agatha").unwrap_err();
        assert!(matches!(err, IdentityError::Api { status: 500, ref kind, .. } if kind == "InternalErrorException"));
    }

    #[test]
    fn test_is_privileged_by_group() {
        assert!(client(Some("admins")).is_privileged(&user(&["admins"])));
        assert!(!client(Some("admins")).is_privileged(&user(&["coaches"])));
        assert!(client(None).is_privileged(&user(&[])));
    }

    #[tokio::test]
    async fn test_unconfigured_rejects() {
        let outcome = UnconfiguredIdentity
            .authenticate("agatha", &SecretString::from("pw"))
            .await
            .unwrap();
        assert!(matches!(outcome, AuthOutcome::Rejected { .. }));
        assert!(!UnconfiguredIdentity.is_privileged(&user(&["admins"])));
    }
}
