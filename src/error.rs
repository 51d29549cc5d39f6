//! Error handling for the portal client

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;
use yic_portal_identity::AuthError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the portal client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Durable session storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Identity provider errors, including the "not configured" case
    #[error(transparent)]
    Identity(#[from] AuthError),

    /// The backend rejected a registration
    #[error("{message}")]
    Validation { status: StatusCode, message: String },

    /// The backend rejected a login
    #[error("{message}")]
    Auth { status: StatusCode, message: String },

    /// The backend could not resolve the current user
    #[error("{message}")]
    UserLookup { status: StatusCode, message: String },

    /// Any other non-success backend response
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// The HTTP status of a backend rejection, if this is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Validation { status, .. }
            | Error::Auth { status, .. }
            | Error::UserLookup { status, .. }
            | Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend reported that the requested record does not exist
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Whether the request never produced an HTTP response
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }
}

/// The backend operation a response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    CurrentUser,
    ListMentors,
}

impl Operation {
    /// Message used when the backend gave no usable `detail`
    pub fn fallback_message(self) -> &'static str {
        match self {
            Operation::Register => "Registration failed",
            Operation::Login => "Login failed",
            Operation::CurrentUser => "Failed to fetch profile",
            Operation::ListMentors => "Failed to fetch mentors",
        }
    }

    pub(crate) fn rejection(self, status: StatusCode, message: String) -> Error {
        match self {
            Operation::Register => Error::Validation { status, message },
            Operation::Login => Error::Auth { status, message },
            Operation::CurrentUser => Error::UserLookup { status, message },
            Operation::ListMentors => Error::Api { status, message },
        }
    }
}
