//! Configuration management for the reservation client.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::api::Session;
use crate::error::ConfigError;
use std::env;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL (`RAFFLE_API_URL`)
    pub api_url: String,
    /// Bearer token for the session (`RAFFLE_API_TOKEN`)
    pub api_token: Option<String>,
    /// Catalog page size (`RAFFLE_PAGE_SIZE`)
    pub page_size: u32,
    /// HTTP request timeout (`RAFFLE_REQUEST_TIMEOUT_SECS`)
    pub request_timeout: Duration,
    /// Auto-dismiss delay for notifications (`RAFFLE_NOTIFICATION_SECS`)
    pub notification_duration: Duration,
}

/// Settings the reservation dialog reducer needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogConfig {
    /// Catalog page size
    pub page_size: u32,
    /// Auto-dismiss delay for notifications
    pub notification_duration: Duration,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            notification_duration: Duration::from_secs(5),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let dialog = DialogConfig::default();
        Self {
            api_url: "http://localhost:3000".to_string(),
            api_token: None,
            page_size: dialog.page_size,
            request_timeout: Duration::from_secs(30),
            notification_duration: dialog.notification_duration,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric variable does not parse or the
    /// page size is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let page_size = parse_var(&lookup, "RAFFLE_PAGE_SIZE")?.unwrap_or(defaults.page_size);
        if page_size == 0 {
            return Err(ConfigError::Zero("RAFFLE_PAGE_SIZE"));
        }

        let request_timeout = parse_var(&lookup, "RAFFLE_REQUEST_TIMEOUT_SECS")?
            .map_or(defaults.request_timeout, Duration::from_secs);
        let notification_duration = parse_var(&lookup, "RAFFLE_NOTIFICATION_SECS")?
            .map_or(defaults.notification_duration, Duration::from_secs);

        Ok(Self {
            api_url: lookup("RAFFLE_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            api_token: lookup("RAFFLE_API_TOKEN").filter(|token| !token.is_empty()),
            page_size,
            request_timeout,
            notification_duration,
        })
    }

    /// Explicit session context for the API client
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(self.api_url.clone(), self.api_token.clone())
    }

    /// Settings for the reservation dialog
    #[must_use]
    pub const fn dialog(&self) -> DialogConfig {
        DialogConfig {
            page_size: self.page_size,
            notification_duration: self.notification_duration,
        }
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var, value })
        })
        .transpose()
}
