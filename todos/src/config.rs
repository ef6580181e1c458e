//! Session configuration.
//!
//! Values are fixed for the whole session. The user id has no default: without
//! one the application refuses to operate.

use crate::error::ConfigError;
use crate::types::UserId;
use std::time::Duration;

/// Environment variable holding the API base URL
pub const ENV_API_URL: &str = "TODOS_API_URL";
/// Environment variable holding the numeric user id
pub const ENV_USER_ID: &str = "TODOS_USER_ID";
/// Environment variable overriding the error auto-clear delay
pub const ENV_ERROR_TIMEOUT_MS: &str = "TODOS_ERROR_TIMEOUT_MS";
/// Environment variable setting a per-request timeout
pub const ENV_REQUEST_TIMEOUT_MS: &str = "TODOS_REQUEST_TIMEOUT_MS";

/// Default error auto-clear delay
pub const DEFAULT_ERROR_TIMEOUT: Duration = Duration::from_secs(3);

/// Todo session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodosConfig {
    /// Base URL of the todo API, without trailing slash.
    ///
    /// Default: `http://localhost:3000`
    pub base_url: String,

    /// Owner of every todo in the session.
    ///
    /// Default: none (operation refused)
    pub user_id: Option<UserId>,

    /// How long an error stays visible.
    ///
    /// Default: 3 seconds
    pub error_timeout: Duration,

    /// Per-request timeout; `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
}

impl TodosConfig {
    /// Create configuration for the API at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set the session user.
    #[must_use]
    pub const fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set the error auto-clear delay.
    #[must_use]
    pub const fn with_error_timeout(mut self, timeout: Duration) -> Self {
        self.error_timeout = timeout;
        self
    }

    /// Set a per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but malformed. A missing user id
    /// is not an error here; see [`Self::require_user_id`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidBaseUrl(url.to_string()));
            }
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup(ENV_USER_ID) {
            let raw = raw.trim();
            if !raw.is_empty() {
                let id = raw
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidUserId(raw.to_string()))?;
                // 0 is what an unset build-time id looks like
                if id != 0 {
                    config.user_id = Some(UserId::new(id));
                }
            }
        }

        if let Some(raw) = lookup(ENV_ERROR_TIMEOUT_MS) {
            config.error_timeout = parse_millis(ENV_ERROR_TIMEOUT_MS, &raw)?;
        }

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            config.request_timeout = Some(parse_millis(ENV_REQUEST_TIMEOUT_MS, &raw)?);
        }

        Ok(config)
    }

    /// The configured user id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingUserId`] if none is set.
    pub const fn require_user_id(&self) -> Result<UserId, ConfigError> {
        match self.user_id {
            Some(id) => Ok(id),
            None => Err(ConfigError::MissingUserId),
        }
    }
}

impl Default for TodosConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            user_id: None,
            error_timeout: DEFAULT_ERROR_TIMEOUT,
            request_timeout: None,
        }
    }
}

fn parse_millis(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidDuration {
            var,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = TodosConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.user_id, None);
        assert_eq!(config.error_timeout, Duration::from_secs(3));
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.require_user_id(), Err(ConfigError::MissingUserId));
    }

    #[test]
    fn builder() {
        let config = TodosConfig::new("https://api.example.com/")
            .with_user_id(UserId::new(42))
            .with_error_timeout(Duration::from_millis(500))
            .with_request_timeout(Duration::from_secs(10));

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.require_user_id(), Ok(UserId::new(42)));
        assert_eq!(config.error_timeout, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn from_lookup_reads_every_variable() {
        let config = TodosConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://todos.example.com/api/"),
            (ENV_USER_ID, " 836 "),
            (ENV_ERROR_TIMEOUT_MS, "1500"),
            (ENV_REQUEST_TIMEOUT_MS, "2000"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://todos.example.com/api");
        assert_eq!(config.user_id, Some(UserId::new(836)));
        assert_eq!(config.error_timeout, Duration::from_millis(1500));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn from_lookup_empty_environment_uses_defaults() {
        let config = TodosConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, TodosConfig::default());
    }

    #[test]
    fn zero_or_blank_user_id_counts_as_missing() {
        for raw in ["0", "", "   "] {
            let config = TodosConfig::from_lookup(lookup(&[(ENV_USER_ID, raw)])).unwrap();
            assert_eq!(config.user_id, None, "user id {raw:?}");
        }
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert_eq!(
            TodosConfig::from_lookup(lookup(&[(ENV_USER_ID, "abc")])),
            Err(ConfigError::InvalidUserId("abc".to_string()))
        );
        assert_eq!(
            TodosConfig::from_lookup(lookup(&[(ENV_API_URL, "ftp://x")])),
            Err(ConfigError::InvalidBaseUrl("ftp://x".to_string()))
        );
        assert_eq!(
            TodosConfig::from_lookup(lookup(&[(ENV_ERROR_TIMEOUT_MS, "3s")])),
            Err(ConfigError::InvalidDuration {
                var: ENV_ERROR_TIMEOUT_MS,
                value: "3s".to_string(),
            })
        );
    }
}
