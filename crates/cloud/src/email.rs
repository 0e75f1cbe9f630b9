//! Transactional email over SMTP.
//!
//! Uses lettre's async SMTP transport (works with SES SMTP credentials).
//! Callers render their own bodies; this module only delivers them.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;

use crate::config::SmtpConfig;

/// Message id returned when no transport is configured.
pub const LOGGED_MESSAGE_ID: &str = "logged-to-console";

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// A message ready to send.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
}

/// Email transport seam.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message and return its message id.
    async fn send(&self, email: &OutgoingEmail) -> Result<String, EmailError>;
}

/// SMTP delivery.
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be set up.
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    fn build(&self, email: &OutgoingEmail, message_id: &str) -> Result<Message, EmailError> {
        let mut builder = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?)
            .subject(&email.subject)
            .message_id(Some(message_id.to_string()));

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(
                reply_to
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(reply_to.clone()))?,
            );
        }

        let text = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(email.text_body.clone());

        let message = match &email.html_body {
            Some(html) => builder.multipart(
                MultiPart::alternative().singlepart(text).singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.clone()),
                ),
            )?,
            None => builder.singlepart(text)?,
        };
        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, email), fields(to = %email.to, subject = %email.subject))]
    async fn send(&self, email: &OutgoingEmail) -> Result<String, EmailError> {
        let message_id = new_message_id(&self.from_address);
        let message = self.build(email, &message_id)?;
        self.mailer.send(message).await?;

        tracing::info!(message_id = %message_id, "Email sent successfully");
        Ok(message_id)
    }
}

/// Writes the message to the log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, EmailError> {
        tracing::info!(
            to = %email.to,
            reply_to = ?email.reply_to,
            subject = %email.subject,
            body = %email.text_body,
            "Email transport not configured, logging message"
        );
        Ok(LOGGED_MESSAGE_ID.to_string())
    }
}

/// SMTP when configured, otherwise [`LogMailer`].
///
/// # Errors
///
/// Returns error if the SMTP relay cannot be set up.
pub fn mailer_from_config(config: Option<&SmtpConfig>) -> Result<std::sync::Arc<dyn Mailer>, SmtpError> {
    Ok(match config {
        Some(config) => std::sync::Arc::new(SmtpMailer::new(config)?),
        None => {
            tracing::warn!("SMTP_HOST not set, emails will only be logged");
            std::sync::Arc::new(LogMailer)
        }
    })
}

fn new_message_id(from_address: &str) -> String {
    let domain = from_address.rsplit_once('@').map_or("localhost", |(_, d)| d);
    format!("<{}@{domain}>", uuid::Uuid::new_v4())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(&SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "user".to_string(),
            password: SecretString::from("pw"),
            from_address: "shop@agathaoeiras.com".to_string(),
        })
        .unwrap()
    }

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to.to_string(),
            reply_to: Some("visitor@example.pt".to_string()),
            subject: "Hello".to_string(),
            text_body: "Plain".to_string(),
            html_body: Some("<p>Plain</p>".to_string()),
        }
    }

    #[tokio::test]
    async fn test_log_mailer_returns_marker_id() {
        let id = LogMailer.send(&email("owner@agathaoeiras.com")).await.unwrap();
        assert_eq!(id, LOGGED_MESSAGE_ID);
    }

    #[tokio::test]
    async fn test_build_rejects_bad_recipient() {
        let result = mailer().build(&email("not an address"), "<id@x>");
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_build_multipart() {
        let message = mailer().build(&email("owner@agathaoeiras.com"), "<id@x>").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Hello"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("Reply-To: visitor@example.pt"));
    }

    #[test]
    fn test_message_id_uses_sender_domain() {
        let id = new_message_id("shop@agathaoeiras.com");
        assert!(id.starts_with('<'));
        assert!(id.ends_with("@agathaoeiras.com>"));
        assert_ne!(id, new_message_id("shop@agathaoeiras.com"));
        assert!(new_message_id("no-domain").ends_with("@localhost>"));
    }
}
