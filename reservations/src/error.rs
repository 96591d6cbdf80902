//! Error types for the remote API and configuration.
//!
//! Local validation failures live next to the code that raises them
//! ([`crate::submitter::ValidationError`], [`crate::normalizer::NumberRejection`]).

use thiserror::Error;

/// Convenience alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by the raffle backend client
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout)
    #[error("Request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status
    ///
    /// `message` is the backend's `error` field when present.
    #[error("{message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message shown to the user
        message: String,
    },

    /// A 2xx response body could not be decoded
    #[error("Response could not be decoded: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed
    #[error("HTTP client could not be built: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// Text for a user-visible notification
    ///
    /// Backend rejections are shown verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors raised while loading [`crate::config::ClientConfig`]
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set but does not parse
    #[error("Invalid value {value:?} for {var}")]
    Invalid {
        /// Environment variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// A variable must be strictly positive
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}
