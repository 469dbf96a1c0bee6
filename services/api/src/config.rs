//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which implementation of the identity provider and account store to run against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Firebase Authentication and Cloud Firestore over their REST APIs.
    Firebase(FirebaseConfig),
    /// In-process adapters, for local development.
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub access_token: String,
    pub identity_toolkit_url: String,
    pub firestore_url: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub production: bool,
    pub backend: Backend,
    pub users_collection: String,
    pub session_cookie_name: String,
    pub require_token_match: bool,
    pub cors_origin: String,
    pub upstream_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Load Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let production = var_or("APP_ENV", "development").eq_ignore_ascii_case("production");

        // --- Load Backend Settings ---
        let backend = match var_or("BACKEND", "firebase").to_lowercase().as_str() {
            "firebase" => {
                let project_id = lookup("FIREBASE_PROJECT_ID")
                    .ok_or_else(|| ConfigError::MissingVar("FIREBASE_PROJECT_ID".to_string()))?;
                let access_token = lookup("GOOGLE_ACCESS_TOKEN")
                    .ok_or_else(|| ConfigError::MissingVar("GOOGLE_ACCESS_TOKEN".to_string()))?;
                Backend::Firebase(FirebaseConfig {
                    project_id,
                    access_token,
                    identity_toolkit_url: var_or(
                        "IDENTITY_TOOLKIT_URL",
                        "https://identitytoolkit.googleapis.com",
                    ),
                    firestore_url: var_or("FIRESTORE_URL", "https://firestore.googleapis.com"),
                })
            }
            "memory" => Backend::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "BACKEND".to_string(),
                    format!("'{}' is not one of firebase, memory", other),
                ))
            }
        };

        // --- Load Account Flow Settings ---
        let users_collection = var_or("USERS_COLLECTION", "users");
        let session_cookie_name = var_or("SESSION_COOKIE_NAME", "session");

        let require_token_match_str = var_or("SIGN_IN_REQUIRE_TOKEN_MATCH", "true");
        let require_token_match = require_token_match_str.parse::<bool>().map_err(|_| {
            ConfigError::InvalidValue(
                "SIGN_IN_REQUIRE_TOKEN_MATCH".to_string(),
                format!("'{}' is not a boolean", require_token_match_str),
            )
        })?;

        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:3000");

        let timeout_str = var_or("UPSTREAM_TIMEOUT_SECS", "10");
        let upstream_timeout = timeout_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidValue("UPSTREAM_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            bind_address,
            log_level,
            production,
            backend,
            users_collection,
            session_cookie_name,
            require_token_match,
            cors_origin,
            upstream_timeout,
        })
    }
}
