//! Fake collaborators.

use std::sync::Mutex;

use async_trait::async_trait;
use oeiras_cloud::{
    AuthOutcome, AuthenticatedUser, EmailError, IdentityError, IdentityProvider, Mailer,
    OutgoingEmail,
};
use secrecy::{ExposeSecret, SecretString};

/// Password accepted for every known user.
pub const ADMIN_PASSWORD: &str = "correct-horse";

const ADMIN_GROUP: &str = "admins";
const CHALLENGE_SESSION: &str = "challenge-session";

/// Identity provider with three users:
///
/// - `admin` is in the admin group
/// - `visitor` can sign in but is not privileged
/// - `newbie` must set a new password first
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeIdentity;

fn user(username: &str, groups: &[&str]) -> AuthenticatedUser {
    AuthenticatedUser {
        username: username.to_string(),
        email: Some(format!("{username}@example.pt")),
        groups: groups.iter().map(|g| (*g).to_string()).collect(),
        access_token: SecretString::from("access-token"),
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthOutcome, IdentityError> {
        if password.expose_secret() != ADMIN_PASSWORD {
            return Ok(AuthOutcome::Rejected {
                reason: "Incorrect username or password.".to_string(),
            });
        }
        Ok(match username {
            "admin" => AuthOutcome::Authenticated(user("admin", &[ADMIN_GROUP])),
            "visitor" => AuthOutcome::Authenticated(user("visitor", &[])),
            "newbie" => AuthOutcome::NewPasswordRequired {
                session: CHALLENGE_SESSION.to_string(),
            },
            _ => AuthOutcome::Rejected {
                reason: "Incorrect username or password.".to_string(),
            },
        })
    }

    async fn complete_new_password(
        &self,
        username: &str,
        _new_password: &SecretString,
        session: &str,
    ) -> Result<AuthOutcome, IdentityError> {
        if username == "newbie" && session == CHALLENGE_SESSION {
            Ok(AuthOutcome::Authenticated(user("newbie", &[ADMIN_GROUP])))
        } else {
            Ok(AuthOutcome::Rejected {
                reason: "Invalid session for the user.".to_string(),
            })
        }
    }

    fn is_privileged(&self, user: &AuthenticatedUser) -> bool {
        user.groups.iter().any(|g| g == ADMIN_GROUP)
    }
}

/// Mailer that records what it was asked to send.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: bool,
}

impl RecordingMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            failing: true,
        }
    }

    /// Messages delivered so far.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, EmailError> {
        if self.failing {
            return Err(EmailError::InvalidAddress(email.to.clone()));
        }
        let mut sent = self.sent.lock().expect("mailer lock");
        sent.push(email.clone());
        Ok(format!("message-{}", sent.len()))
    }
}
