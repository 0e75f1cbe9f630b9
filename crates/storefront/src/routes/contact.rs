//! Contact form route handlers.
//!
//! Messages are emailed to the shop owner with the visitor as `Reply-To`.
//! A transport failure never fails the request: the visitor is told the
//! message was received and the reply may be delayed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use oeiras_cloud::OutgoingEmail;
use oeiras_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::cart::cart_item_count;
use crate::state::AppState;

const SENT_NOTICE: &str = "Thank you for your message! We'll get back to you soon.";
const DELAYED_NOTICE: &str =
    "Thank you, your message has been received. Our reply may be delayed.";

/// Contact form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Check required fields, returning the parsed sender address.
    fn validate(&self) -> Result<Email, &'static str> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.message.trim().is_empty()
        {
            return Err("All fields are required");
        }
        Email::parse(self.email.trim()).map_err(|_| "Please enter a valid email address.")
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub form: ContactForm,
    pub error: Option<String>,
    pub success: Option<String>,
    pub cart_item_count: u64,
}

/// HTML body of the owner notification.
#[derive(Template)]
#[template(path = "email/contact.html")]
pub struct ContactEmailHtml<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// Plain text body of the owner notification.
#[derive(Template)]
#[template(path = "email/contact.txt")]
pub struct ContactEmailText<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// Build the owner notification for a submitted form.
///
/// # Errors
///
/// Returns error if a body template fails to render.
pub fn contact_email(form: &ContactForm, from: &Email, to: &str) -> askama::Result<OutgoingEmail> {
    let name = form.name.trim();
    let message = form.message.trim();
    Ok(OutgoingEmail {
        to: to.to_string(),
        reply_to: Some(from.to_string()),
        subject: format!("New Contact Form Message from {name}"),
        text_body: ContactEmailText {
            name,
            email: from.as_str(),
            message,
        }
        .render()?,
        html_body: Some(
            ContactEmailHtml {
                name,
                email: from.as_str(),
                message,
            }
            .render()?,
        ),
    })
}

/// Display the contact page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> ContactTemplate {
    ContactTemplate {
        form: ContactForm::default(),
        error: None,
        success: None,
        cart_item_count: cart_item_count(&session).await,
    }
}

/// Handle a contact form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> ContactTemplate {
    let cart_item_count = cart_item_count(&session).await;

    let from = match form.validate() {
        Ok(from) => from,
        Err(error) => {
            return ContactTemplate {
                form,
                error: Some(error.to_string()),
                success: None,
                cart_item_count,
            };
        }
    };

    let delivered = match contact_email(&form, &from, &state.config().contact_to_email) {
        Ok(email) => match state.mailer().send(&email).await {
            Ok(message_id) => {
                tracing::info!(message_id = %message_id, "Contact message sent");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to send contact message");
                false
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to render contact message");
            false
        }
    };

    ContactTemplate {
        form: ContactForm::default(),
        error: None,
        success: Some(if delivered { SENT_NOTICE } else { DELAYED_NOTICE }.to_string()),
        cart_item_count,
    }
}
