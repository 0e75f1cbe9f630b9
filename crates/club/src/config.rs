//! Club console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CLUB_HOST` - Bind address (default: 127.0.0.1)
//! - `CLUB_PORT` - Listen port (default: 3001)
//! - `CLUB_BASE_URL` - Public URL (default: `http://localhost:<port>`)
//! - `CLUB_STATIC_DIR` - Console page and scripts (default: crates/club/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE`
//!
//! Store, identity and SMTP settings are shared with the storefront and
//! documented in [`oeiras_cloud::config`].

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use oeiras_cloud::config::{
    CognitoConfig, ConfigError, SmtpConfig, StoreConfig, get_env_or_default, get_optional_env,
    parse_env_or_default,
};

/// Club console configuration.
#[derive(Debug, Clone)]
pub struct ClubConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the console
    pub base_url: String,
    /// Directory served at `/`
    pub static_dir: PathBuf,
    /// Document store
    pub store: StoreConfig,
    /// Admin sign-in
    pub cognito: Option<CognitoConfig>,
    /// Outgoing email
    pub smtp: Option<SmtpConfig>,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl ClubConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or a provider secret
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        oeiras_cloud::config::load_dotenv();

        let host = parse_env_or_default("CLUB_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or_default("CLUB_PORT", 3001_u16)?;

        Ok(Self {
            host,
            port,
            base_url: get_env_or_default("CLUB_BASE_URL", &format!("http://localhost:{port}")),
            static_dir: get_env_or_default("CLUB_STATIC_DIR", "crates/club/static").into(),
            store: StoreConfig::from_env(),
            cognito: CognitoConfig::from_env()?,
            smtp: SmtpConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Configuration with every collaborator switched off.
    #[must_use]
    pub fn local() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            static_dir: PathBuf::from("crates/club/static"),
            store: StoreConfig::default(),
            cognito: None,
            smtp: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

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
