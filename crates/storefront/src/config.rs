//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:<port>`)
//! - `STOREFRONT_STATIC_DIR` - Stylesheets and scripts (default: crates/storefront/static)
//! - `STOREFRONT_UPLOADS_DIR` - Local image uploads (default: crates/storefront/uploads)
//! - `CONTACT_TO_EMAIL` - Recipient of contact form messages
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE`
//!
//! Store, identity, object storage and SMTP settings are shared with the
//! club console and documented in [`oeiras_cloud::config`].

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use oeiras_cloud::config::{
    CognitoConfig, ConfigError, ObjectStorageConfig, SmtpConfig, StoreConfig, get_env_or_default,
    get_optional_env, parse_env_or_default,
};

const DEFAULT_CONTACT_EMAIL: &str = "agatha.abdala@hotmail.com";

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Directory for locally stored images, served under `/uploads`
    pub uploads_dir: PathBuf,
    /// Where contact form messages are delivered
    pub contact_to_email: String,
    /// Document store
    pub store: StoreConfig,
    /// Admin sign-in
    pub cognito: Option<CognitoConfig>,
    /// Remote image storage
    pub object_storage: Option<ObjectStorageConfig>,
    /// Outgoing email
    pub smtp: Option<SmtpConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first when one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or a provider secret
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        oeiras_cloud::config::load_dotenv();

        let host = parse_env_or_default("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or_default("STOREFRONT_PORT", 3000_u16)?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", &format!("http://localhost:{port}"));

        Ok(Self {
            host,
            port,
            base_url,
            static_dir: get_env_or_default("STOREFRONT_STATIC_DIR", "crates/storefront/static").into(),
            uploads_dir: get_env_or_default("STOREFRONT_UPLOADS_DIR", "crates/storefront/uploads")
                .into(),
            contact_to_email: get_env_or_default("CONTACT_TO_EMAIL", DEFAULT_CONTACT_EMAIL),
            store: StoreConfig::from_env(),
            cognito: CognitoConfig::from_env()?,
            object_storage: ObjectStorageConfig::from_env()?,
            smtp: SmtpConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Configuration for tests and local runs: everything optional is off.
    #[must_use]
    pub fn local(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            static_dir: PathBuf::from("crates/storefront/static"),
            uploads_dir: uploads_dir.into(),
            contact_to_email: DEFAULT_CONTACT_EMAIL.to_string(),
            store: StoreConfig::default(),
            cognito: None,
            object_storage: None,
            smtp: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}
