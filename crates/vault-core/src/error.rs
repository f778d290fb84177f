//! Error types for FlavourVault.

use thiserror::Error;

/// Result type alias using FlavourVault's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Longest remote message that is still surfaced to the user verbatim.
/// Anything longer is assumed to be an internal detail and replaced with a
/// generic message.
const MAX_VERBATIM_MESSAGE_LEN: usize = 100;

/// Core error type for FlavourVault operations.
///
/// Repository and service functions never panic past their boundary — every
/// failure becomes one of these variants, and callers decide what (if
/// anything) to show the user via [`Error::user_message`].
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (network unreachable, timeout).
    #[error("Request error: {0}")]
    Request(String),

    /// Authentication/authorization failed (not signed in, row not owned).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Recipe not found — an expected outcome, not a transport failure.
    #[error("Recipe not found: {0}")]
    RecipeNotFound(uuid::Uuid),

    /// Some other resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote store rejected the request (constraint violation, bad row).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Legacy-store migration failed.
    #[error("Migration error: {0}")]
    Migration(String),

    /// File I/O operation failed (legacy store).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True if this error represents a missing resource rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RecipeNotFound(_) | Error::NotFound(_))
    }

    /// Map the error to a user-facing message.
    ///
    /// Transport errors collapse to a generic connection message; auth errors
    /// pass through verbatim; remote validation messages pass through only
    /// when short enough to be human-readable.
    pub fn user_message(&self) -> String {
        match self {
            Error::Request(_) => {
                "Connection error. Please check your internet connection and try again."
                    .to_string()
            }
            Error::Unauthorized(msg) => msg.clone(),
            Error::RecipeNotFound(_) | Error::NotFound(_) => "Recipe not found.".to_string(),
            Error::Validation(msg) if msg.len() < MAX_VERBATIM_MESSAGE_LEN => msg.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
