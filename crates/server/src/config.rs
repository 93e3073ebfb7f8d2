//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FOODGRAM_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `FOODGRAM_HOST` - Bind address (default: 127.0.0.1)
//! - `FOODGRAM_PORT` - Listen port (default: 8000)
//! - `FOODGRAM_BASE_URL` - Public URL used for absolute links (default: `http://localhost:8000`)
//! - `FOODGRAM_MEDIA_ROOT` - Directory for uploaded images (default: `media`)
//! - `FOODGRAM_PAGE_SIZE` - Default page size for paginated lists (default: 6)
//! - `FOODGRAM_MAX_PAGE_SIZE` - Upper bound for the `limit` query parameter (default: 100)
//! - `FOODGRAM_CORS_ORIGINS` - Comma-separated list of allowed origins
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_PAGE_SIZE: u32 = 6;
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Directory where uploaded recipe images are stored
    pub media_root: PathBuf,
    /// Pagination defaults
    pub pagination: PaginationConfig,
    /// Allowed CORS origins (empty disables the CORS layer)
    pub cors_origins: Vec<String>,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Page sizes for paginated endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Page size used when the client sends no `limit`
    pub default_page_size: u32,
    /// Largest `limit` a client may request
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Sentry settings. Sentry stays disabled when `dsn` is `None`.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Lookup(lookup);

        let database_url = env
            .get("FOODGRAM_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("FOODGRAM_DATABASE_URL".to_string()))?;

        let host = env.parse_or("FOODGRAM_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = env.parse_or("FOODGRAM_PORT", 8000_u16)?;

        let base_url = env
            .get("FOODGRAM_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8000".to_string());
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("FOODGRAM_BASE_URL".to_string(), e.to_string())
        })?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let media_root = PathBuf::from(
            env.get("FOODGRAM_MEDIA_ROOT")
                .unwrap_or_else(|| "media".to_string()),
        );

        let pagination = PaginationConfig {
            default_page_size: env.parse_or("FOODGRAM_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            max_page_size: env.parse_or("FOODGRAM_MAX_PAGE_SIZE", DEFAULT_MAX_PAGE_SIZE)?,
        };
        if pagination.default_page_size == 0
            || pagination.default_page_size > pagination.max_page_size
        {
            return Err(ConfigError::InvalidEnvVar(
                "FOODGRAM_PAGE_SIZE".to_string(),
                format!(
                    "must be between 1 and FOODGRAM_MAX_PAGE_SIZE ({})",
                    pagination.max_page_size
                ),
            ));
        }

        let cors_origins = env
            .get("FOODGRAM_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let sentry = SentryConfig {
            dsn: env.get("SENTRY_DSN").filter(|s| !s.is_empty()),
            environment: env.get("SENTRY_ENVIRONMENT"),
            sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            media_root,
            pagination,
            cors_origins,
            sentry,
        })
    }

    /// Configuration with defaults for everything except the database URL.
    #[must_use]
    pub fn with_database_url(database_url: SecretString) -> Self {
        Self {
            database_url,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            base_url: "http://localhost:8000".to_string(),
            media_root: PathBuf::from("media"),
            pagination: PaginationConfig::default(),
            cors_origins: Vec::new(),
            sentry: SentryConfig::default(),
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "FOODGRAM_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fly/db")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly/db");
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("FOODGRAM_DATABASE_URL", "postgres://localhost/foodgram")]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.pagination, PaginationConfig::default());
        assert!(config.cors_origins.is_empty());
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("FOODGRAM_DATABASE_URL", "postgres://localhost/foodgram"),
            ("FOODGRAM_HOST", "0.0.0.0"),
            ("FOODGRAM_PORT", "9000"),
            ("FOODGRAM_BASE_URL", "https://foodgram.example/"),
            ("FOODGRAM_PAGE_SIZE", "10"),
            ("FOODGRAM_CORS_ORIGINS", "http://localhost:3000, https://foodgram.example"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.base_url, "https://foodgram.example");
        assert_eq!(config.pagination.default_page_size, 10);
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("FOODGRAM_DATABASE_URL", "postgres://localhost/foodgram"),
            ("FOODGRAM_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "FOODGRAM_PORT"));
    }

    #[test]
    fn test_page_size_must_fit_max() {
        let err = load(&[
            ("FOODGRAM_DATABASE_URL", "postgres://localhost/foodgram"),
            ("FOODGRAM_PAGE_SIZE", "500"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "FOODGRAM_PAGE_SIZE"));
    }

    #[test]
    fn test_database_url_redacted_in_debug() {
        let config = load(&[("FOODGRAM_DATABASE_URL", "postgres://u:hunter2@db/foodgram")]).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
