//! Error types for the chat relay
//!
//! Defines application-level errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::validate::{MAX_NAME_LEN, MIN_NAME_LEN};

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and
/// business errors (reported to the offending client as a line of text).
#[derive(Debug, Error)]
pub enum AppError {
    /// Socket read failure or over-long line (fatal for the connection)
    #[error("Line read error: {0}")]
    Lines(#[from] tokio_util::codec::AnyDelimiterCodecError),

    /// Channel send error (fatal - the server actor is gone)
    #[error("Channel send error")]
    ChannelSend,

    /// Registry already holds the maximum number of sessions
    #[error("Server is full")]
    CapacityExceeded,

    /// Session handle is not in the registry
    #[error("Session not registered")]
    NotRegistered,

    /// Another active session already uses this name
    #[error("Username {0} is already taken")]
    NameTaken(String),

    /// Rename target outside the allowed length
    #[error(
        "Invalid username length, must be between {} and {} characters",
        MIN_NAME_LEN,
        MAX_NAME_LEN
    )]
    InvalidNameLength,
}

impl AppError {
    /// Text sent to the client for a business error
    ///
    /// Returns None for fatal errors, which close the connection instead.
    pub fn client_notice(&self) -> Option<String> {
        match self {
            AppError::NameTaken(name) => Some(format!(
                "Username {} is already taken. Please choose another.\n",
                name
            )),
            AppError::InvalidNameLength => Some(format!(
                "Invalid username length. Must be between {} and {} characters.\n",
                MIN_NAME_LEN, MAX_NAME_LEN
            )),
            _ => None,
        }
    }
}
