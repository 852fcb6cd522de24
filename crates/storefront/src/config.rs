//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GIFTWELL_BACKEND_URL` - Base URL of the account backend
//! - `SQUARE_ACCESS_TOKEN` - Square API access token (high entropy)
//! - `SQUARE_LOCATION_ID` - Square location the gift cards belong to
//!
//! ## Optional
//! - `GIFTWELL_HOST` - Bind address (default: 127.0.0.1)
//! - `GIFTWELL_PORT` - Listen port (default: 3000)
//! - `SQUARE_ENVIRONMENT` - `sandbox` or `production` (default: sandbox)
//! - `SQUARE_BASE_URL` - Override the Square API host (local mocks)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Account backend configuration
    pub backend: BackendConfig,
    /// Square API configuration
    pub square: SquareConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Account backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the account backend
    pub base_url: Url,
}

/// Square API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct SquareConfig {
    /// Which Square environment to talk to
    pub environment: SquareEnvironment,
    /// Explicit API host, overriding the environment's default
    pub base_url_override: Option<Url>,
    /// API access token (server-side only)
    pub access_token: SecretString,
    /// Location the gift cards belong to
    pub location_id: String,
}

impl SquareConfig {
    /// The API host to call: the override when set, otherwise the
    /// environment's default host.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        self.base_url_override.as_ref().map_or_else(
            || self.environment.base_url().to_owned(),
            |url| url.as_str().trim_end_matches('/').to_owned(),
        )
    }
}

impl std::fmt::Debug for SquareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SquareConfig")
            .field("environment", &self.environment)
            .field("base_url_override", &self.base_url_override)
            .field("access_token", &"[REDACTED]")
            .field("location_id", &self.location_id)
            .finish()
    }
}

/// The Square environment a deployment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareEnvironment {
    Sandbox,
    Production,
}

impl SquareEnvironment {
    /// Base URL for this environment's API host.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://connect.squareupsandbox.com",
            Self::Production => "https://connect.squareup.com",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "sandbox" => Some(Self::Sandbox),
            "production" => Some(Self::Production),
            _ => None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("GIFTWELL_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GIFTWELL_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("GIFTWELL_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("GIFTWELL_PORT".to_string(), e.to_string()))?;

        let backend = BackendConfig::from_env()?;
        let square = SquareConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            backend,
            square,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("GIFTWELL_BACKEND_URL")?;
        let base_url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("GIFTWELL_BACKEND_URL".to_string(), e.to_string())
        })?;
        Ok(Self { base_url })
    }
}

impl SquareConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let environment_raw = get_env_or_default("SQUARE_ENVIRONMENT", "sandbox");
        let environment = SquareEnvironment::parse(&environment_raw).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "SQUARE_ENVIRONMENT".to_string(),
                format!("expected 'sandbox' or 'production', got '{environment_raw}'"),
            )
        })?;

        let base_url_override = get_optional_env("SQUARE_BASE_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("SQUARE_BASE_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            environment,
            base_url_override,
            access_token: get_validated_secret("SQUARE_ACCESS_TOKEN")?,
            location_id: get_required_env("SQUARE_LOCATION_ID")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
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
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
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
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-access-token-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        let result = validate_secret_strength("changeme123", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_square_environment_parse() {
        assert_eq!(
            SquareEnvironment::parse("sandbox"),
            Some(SquareEnvironment::Sandbox)
        );
        assert_eq!(
            SquareEnvironment::parse("PRODUCTION"),
            Some(SquareEnvironment::Production)
        );
        assert_eq!(SquareEnvironment::parse("staging"), None);
    }

    #[test]
    fn test_square_environment_base_urls() {
        assert_eq!(
            SquareEnvironment::Sandbox.base_url(),
            "https://connect.squareupsandbox.com"
        );
        assert_eq!(
            SquareEnvironment::Production.base_url(),
            "https://connect.squareup.com"
        );
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            backend: BackendConfig {
                base_url: Url::parse("http://localhost:4000").unwrap(),
            },
            square: SquareConfig {
                environment: SquareEnvironment::Sandbox,
                base_url_override: None,
                access_token: SecretString::from("token"),
                location_id: "L123".to_string(),
            },
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_square_config_debug_redacts_token() {
        let config = SquareConfig {
            environment: SquareEnvironment::Sandbox,
            base_url_override: None,
            access_token: SecretString::from("super_secret_access_token"),
            location_id: "L123".to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("L123"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_access_token"));
    }
}
