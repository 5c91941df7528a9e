//! Unified error types for the `VoltTrack` core.
//!
//! Every failure in this crate is one of these variants. None of them is
//! fatal to a running application: the controller catches errors at the
//! action-dispatch boundary and surfaces them as dismissable notices.

use thiserror::Error;

/// All errors produced by the `VoltTrack` core.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad credentials or an unreachable authentication endpoint.
    /// The message is the backend's human-readable response when the call
    /// completed, or a generic network-failure message when it did not.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Human-readable cause shown to the user
        message: String,
    },

    /// A collection load failed. Callers treat this as "empty collection,
    /// show error", never as fatal.
    #[error("Fetch failed: {message}")]
    Fetch {
        /// Human-readable cause shown to the user
        message: String,
    },

    /// A mutation referenced a meter that is not in the local collections.
    #[error("Meter not found: {id}")]
    MeterNotFound {
        /// Identifier the caller supplied
        id: String,
    },

    /// Generic transport failure on a write or other authenticated call.
    #[error("Network error: {message}")]
    Network {
        /// Human-readable cause shown to the user
        message: String,
    },

    /// Persisted session data was malformed or could not be handled.
    #[error("Session error: {message}")]
    Session {
        /// Human-readable cause
        message: String,
    },

    /// Configuration file or environment problem.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable cause
        message: String,
    },

    /// I/O error, typically from the session file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Network {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
