//! Service configuration.

use std::time::Duration;

use fuelpos_store::StoreOptions;

/// Time a sale needs after its lock wait to append and commit.
///
/// The request timeout must cover the lock wait plus this much, otherwise a
/// sale could commit after its caller was already told it timed out.
pub const COMMIT_HEADROOM: Duration = Duration::from_secs(1);

/// Errors in the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The request timeout does not leave room for a full lock wait and commit.
    #[error(
        "REQUEST_TIMEOUT_SECONDS ({request_timeout_seconds}s) must be at least \
         LOCK_TIMEOUT_MS ({lock_timeout_ms}ms) plus {headroom_ms}ms"
    )]
    TimeoutTooShort {
        /// Configured request timeout.
        request_timeout_seconds: u64,
        /// Configured lock timeout.
        lock_timeout_ms: u64,
        /// Required headroom beyond the lock wait.
        headroom_ms: u128,
    },
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "./data/fuelpos").
    pub data_dir: String,

    /// Admin API key accepted in `X-Admin-Key`.
    pub admin_api_key: Option<String>,

    /// HS256 secret for session tokens.
    pub jwt_secret: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// How long a sale waits for a fuel row lock, in milliseconds.
    pub lock_timeout_ms: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            admin_api_key: non_empty_var("ADMIN_API_KEY"),
            jwt_secret: non_empty_var("JWT_SECRET"),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: parsed_var("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: parsed_var("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
            lock_timeout_ms: parsed_var("LOCK_TIMEOUT_MS").unwrap_or(defaults.lock_timeout_ms),
        }
    }

    /// Check settings that only make sense together.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::TimeoutTooShort` if a sale blocked for the whole
    /// lock timeout could still be running when the request times out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let worst_case =
            Duration::from_millis(self.lock_timeout_ms).saturating_add(COMMIT_HEADROOM);
        if worst_case > self.request_timeout() {
            return Err(ConfigError::TimeoutTooShort {
                request_timeout_seconds: self.request_timeout_seconds,
                lock_timeout_ms: self.lock_timeout_ms,
                headroom_ms: COMMIT_HEADROOM.as_millis(),
            });
        }
        Ok(())
    }

    /// The request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Storage options derived from this configuration.
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "./data/fuelpos".into(),
            admin_api_key: None,
            jwt_secret: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024, // 1MB
            request_timeout_seconds: 30,
            lock_timeout_ms: 2000,
        }
    }
}
