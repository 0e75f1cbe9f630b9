//! Environment configuration shared by both apps.
//!
//! # Environment Variables
//!
//! All optional. A service whose variables are absent runs in its offline
//! mode (fallback store, rejecting identity provider, local uploads, logged
//! email).
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string for the document store
//! - `FALLBACK_STORE_PATH` - Persist the fallback store to this JSON file
//! - `COGNITO_REGION` - User pool region (default: eu-west-1)
//! - `COGNITO_CLIENT_ID` - App client id; enables the identity provider
//! - `COGNITO_CLIENT_SECRET` - App client secret (high entropy)
//! - `COGNITO_ADMIN_GROUP` - Group whose members may use the admin areas
//! - `COGNITO_ENDPOINT` - Override the regional API endpoint
//! - `OBJECT_STORAGE_ENDPOINT` - Bucket endpoint accepting `PUT`/`DELETE`
//! - `OBJECT_STORAGE_TOKEN` - Bearer token for the bucket endpoint
//! - `OBJECT_STORAGE_PUBLIC_URL` - Public base URL of stored objects
//! - `SMTP_HOST` / `SMTP_PORT` (587) / `SMTP_USERNAME` / `SMTP_PASSWORD`
//! - `EMAIL_FROM` - Sender address (required when `SMTP_HOST` is set)

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Load `.env` if present.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Document store configuration.
#[derive(Clone, Default)]
pub struct StoreConfig {
    pub database_url: Option<SecretString>,
    pub fallback_path: Option<PathBuf>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("fallback_path", &self.fallback_path)
            .finish()
    }
}

impl StoreConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: get_optional_env("DATABASE_URL").map(SecretString::from),
            fallback_path: get_optional_env("FALLBACK_STORE_PATH").map(PathBuf::from),
        }
    }
}

/// Cognito user pool client configuration.
#[derive(Clone)]
pub struct CognitoConfig {
    pub region: String,
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub admin_group: Option<String>,
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for CognitoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CognitoConfig")
            .field("region", &self.region)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("admin_group", &self.admin_group)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl CognitoConfig {
    /// `None` when `COGNITO_CLIENT_ID` is unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the client secret looks like a placeholder.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(client_id) = get_optional_env("COGNITO_CLIENT_ID") else {
            return Ok(None);
        };
        let client_secret = get_optional_env("COGNITO_CLIENT_SECRET")
            .map(|value| {
                validate_secret_strength(&value, "COGNITO_CLIENT_SECRET")?;
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;

        Ok(Some(Self {
            region: get_env_or_default("COGNITO_REGION", "eu-west-1"),
            client_id,
            client_secret,
            admin_group: get_optional_env("COGNITO_ADMIN_GROUP"),
            endpoint: get_optional_env("COGNITO_ENDPOINT"),
        }))
    }

    /// API endpoint, regional unless overridden.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.region))
    }
}

/// Object storage bucket configuration.
#[derive(Clone)]
pub struct ObjectStorageConfig {
    pub endpoint: String,
    pub token: SecretString,
    pub public_base_url: String,
}

impl std::fmt::Debug for ObjectStorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorageConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

impl ObjectStorageConfig {
    /// `None` when `OBJECT_STORAGE_ENDPOINT` is unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the token is missing or looks like a placeholder.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(endpoint) = get_optional_env("OBJECT_STORAGE_ENDPOINT") else {
            return Ok(None);
        };
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let public_base_url = get_optional_env("OBJECT_STORAGE_PUBLIC_URL")
            .map_or_else(|| endpoint.clone(), |url| url.trim_end_matches('/').to_string());

        Ok(Some(Self {
            token: get_validated_secret("OBJECT_STORAGE_TOKEN")?,
            endpoint,
            public_base_url,
        }))
    }
}

/// SMTP transport configuration.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl SmtpConfig {
    /// `None` when `SMTP_HOST` is unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a companion variable is missing or invalid.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };
        Ok(Some(Self {
            host,
            port: parse_env_or_default("SMTP_PORT", 587)?,
            username: get_required_env("SMTP_USERNAME")?,
            password: SecretString::from(get_required_env("SMTP_PASSWORD")?),
            from_address: get_required_env("EMAIL_FROM")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if unset or blank.
pub fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank as unset.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, using `default` when unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value does not parse.
pub fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` describing the problem.
pub fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
///
/// # Errors
///
/// Returns `ConfigError` if missing or weak.
pub fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
