//! services/portal/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
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

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Base URL of the remote platform API, without a trailing slash.
    pub remote_api_url: String,
    pub log_level: Level,
    pub request_timeout: Duration,
    pub roster_base_image: PathBuf,
    pub roster_font: PathBuf,
    pub cors_origin: String,
    /// Viewer and roster sessions untouched for this long are dropped.
    pub session_idle_timeout: Duration,
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

    /// Builds the configuration from any key lookup. `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Remote API ---
        let remote_api_url = lookup("REMOTE_API_URL")
            .ok_or_else(|| ConfigError::MissingVar("REMOTE_API_URL".to_string()))?
            .trim_end_matches('/')
            .to_string();
        if !remote_api_url.starts_with("http://") && !remote_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "REMOTE_API_URL".to_string(),
                format!("'{}' is not an http(s) URL", remote_api_url),
            ));
        }

        let timeout_str = lookup("REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "30".to_string());
        let request_timeout = timeout_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let idle_str = lookup("SESSION_IDLE_TIMEOUT_SECS").unwrap_or_else(|| "3600".to_string());
        let session_idle_timeout = idle_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SESSION_IDLE_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", idle_str),
                )
            })?;

        // --- Roster Diagram Assets ---
        let roster_base_image = lookup("ROSTER_BASE_IMAGE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./assets/roster_base.png"));
        let roster_font = lookup("ROSTER_FONT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./assets/roster_font.ttf"));

        Ok(Self {
            bind_address,
            remote_api_url,
            log_level,
            request_timeout,
            roster_base_image,
            roster_font,
            cors_origin,
            session_idle_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_remote_url_is_set() {
        let config =
            Config::from_lookup(lookup(&[("REMOTE_API_URL", "https://api.igreja.org/api/")]))
                .unwrap();

        assert_eq!(config.remote_api_url, "https://api.igreja.org/api");
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.roster_font, PathBuf::from("./assets/roster_font.ttf"));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn remote_url_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "REMOTE_API_URL"));
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = Config::from_lookup(lookup(&[
            ("REMOTE_API_URL", "https://api.igreja.org"),
            ("REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "REQUEST_TIMEOUT_SECS"));

        let err = Config::from_lookup(lookup(&[
            ("REMOTE_API_URL", "https://api.igreja.org"),
            ("SESSION_IDLE_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue(var, _) if var == "SESSION_IDLE_TIMEOUT_SECS")
        );

        let err = Config::from_lookup(lookup(&[("REMOTE_API_URL", "ftp://files")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "REMOTE_API_URL"));
    }
}
