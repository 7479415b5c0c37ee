//! # Client Error Types
//!
//! Error types for everything that talks to the server or the disk.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Local       │  │     Remote      │  │     Transport           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  Remote{status, │  │  Http                   │ │
//! │  │  InFlight       │  │   message,      │  │  Decode                 │ │
//! │  │  NotAuth'd      │  │   field_errors} │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │  Configuration  │  │    Storage      │                              │
//! │  │                 │  │                 │                              │
//! │  │  InvalidConfig  │  │  Io             │                              │
//! │  │  InvalidUrl     │  │  (session file) │                              │
//! │  │  ConfigLoad/Save│  │                 │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is retried. Local errors never reach the network; remote errors
//! keep the server's message unchanged.

use std::collections::BTreeMap;

use evently_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// An error response from the REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// HTTP status code.
    pub status: u16,
    /// The server's message, verbatim.
    pub message: String,
    /// Per-field messages, when the server sent any.
    pub field_errors: BTreeMap<String, String>,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Client error type covering all failures outside the pure core.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Rejected before anything was sent.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// A submission is already waiting for the server.
    #[error("A transaction is already being submitted")]
    SubmissionInFlight,

    /// The endpoint needs a signed-in user.
    #[error("Please log in first")]
    NotAuthenticated,

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The server answered with a non-success status.
    #[error("{0}")]
    Remote(RemoteError),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Connection, TLS or timeout failure.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A success response whose body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation(CoreError::Validation(err))
    }
}

impl From<RemoteError> for ClientError {
    fn from(err: RemoteError) -> Self {
        ClientError::Remote(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// True when the error was raised locally and nothing was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_)
                | ClientError::SubmissionInFlight
                | ClientError::NotAuthenticated
        )
    }

    /// The server's rejection, if that is what this is.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            ClientError::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    /// True for 401 responses and missing sessions.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ClientError::NotAuthenticated => true,
            ClientError::Remote(remote) => remote.status == 401,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}
