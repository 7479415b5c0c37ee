//! # CLI Error Type
//!
//! Unified error type for commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  Command Function                                                       │
//! │  Result<T, CliError>                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Local rule? ──── CoreError / ValidationError ────┐                    │
//! │         │                                          │                    │
//! │         ▼                                          ▼                    │
//! │  Server said no? ── ClientError::Remote ───────► CliError ──► stderr   │
//! │         │                                          │         exit code │
//! │         ▼                                          │                    │
//! │  Transport? ─────── ClientError::Http ────────────┘                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With `--json` the error is printed as `{"code": ..., "message": ...}`.
//! Server messages are passed through unchanged.

use evently_client::ClientError;
use evently_core::{CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Error returned from commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct CliError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes, one exit status each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input rejected before anything was sent
    ValidationError,

    /// No session, or the server refused the token
    Unauthorized,

    /// Resource not found (404)
    NotFound,

    /// Any other non-success answer from the server
    Rejected,

    /// A submission is already in flight
    Conflict,

    /// Server unreachable or timed out
    Network,

    /// Bad config file or environment
    Config,

    /// Unexpected response or local I/O failure
    Internal,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorCode::Internal => 1,
            ErrorCode::ValidationError => 2,
            ErrorCode::Unauthorized => 3,
            ErrorCode::NotFound => 4,
            ErrorCode::Rejected => 5,
            ErrorCode::Conflict => 6,
            ErrorCode::Network => 7,
            ErrorCode::Config => 78,
        }
    }
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        CliError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.code.exit_code()
    }
}

/// Converts client errors to CLI errors.
impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Validation(e) => CliError::from(e),
            ClientError::SubmissionInFlight => CliError::new(ErrorCode::Conflict, err.to_string()),
            ClientError::NotAuthenticated => CliError::new(ErrorCode::Unauthorized, err.to_string()),
            ClientError::Remote(remote) => {
                let code = match remote.status {
                    401 | 403 => ErrorCode::Unauthorized,
                    404 => ErrorCode::NotFound,
                    _ => ErrorCode::Rejected,
                };
                CliError::new(code, remote.message)
            }
            ClientError::Http(e) => {
                tracing::error!("Request failed: {}", e);
                CliError::new(ErrorCode::Network, format!("Could not reach the server: {}", e))
            }
            ClientError::Decode(e) => {
                tracing::error!("Unexpected response: {}", e);
                CliError::internal("The server sent an unexpected response")
            }
            ClientError::InvalidConfig(_)
            | ClientError::InvalidUrl(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::ConfigSaveFailed(_) => CliError::new(ErrorCode::Config, err.to_string()),
            ClientError::Io(e) => CliError::internal(format!("I/O error: {}", e)),
        }
    }
}

/// Converts core errors to CLI errors.
impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TicketTypeNotFound(id) => CliError::not_found("Ticket type", &id),
            CoreError::Validation(e) => CliError::from(e),
            other => CliError::validation(other.to_string()),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("Failed to encode output: {}", err))
    }
}

/// Result type for commands.
pub type CliResult<T> = Result<T, CliError>;
