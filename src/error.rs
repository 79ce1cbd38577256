//! Unified error handling for factbot.
//!
//! Each layer gets its own `thiserror` enum; the binary glues them together
//! with `anyhow`. Failures inside one subscriber or one command are logged
//! and never abort their siblings.

use thiserror::Error;

// ============================================================================
// Transport Errors (protocol collaborator)
// ============================================================================

/// Failures talking to the IRC server.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("send queue full for {0:?}")]
    Timeout(std::time::Duration),

    #[error("protocol error: {0}")]
    Protocol(#[from] factbot_proto::ProtocolError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Store Errors (factoid persistence)
// ============================================================================

/// Factoid store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{key}' is not a {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("no such factoid: {0}")]
    NotFound(String),
}

// ============================================================================
// Command Errors (handler failures)
// ============================================================================

/// Errors a command handler can return.
///
/// The registry logs these and moves on to the next descriptor.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("send error: {0}")]
    Send(#[from] TransportError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CommandError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Store(StoreError::WrongType { .. }) => "wrong_type",
            Self::Store(StoreError::NotFound(_)) => "not_found",
            Self::Store(_) => "store_error",
            Self::Send(_) => "send_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for command handlers.
pub type CommandResult<T = crate::commands::Outcome> = Result<T, CommandError>;
