//! Error types for the Tableau client
//!
//! Every operation of the client returns a [`TableauResult`]. The variants map
//! one-to-one onto the outcomes a caller has to tell apart: failed sign-in,
//! rejected session, create conflicts, ambiguous lookups, failed role
//! verification, undecodable payloads and any other server-side failure.

use thiserror::Error;

use crate::models::User;

/// Error detail parsed from a `<tsResponse><error .../></tsResponse>` body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub summary: String,
    pub detail: String,
}

/// Custom error type for Tableau REST operations
#[derive(Error, Debug)]
pub enum TableauError {
    /// Sign-in was rejected by the server
    #[error("failed to log in - server responded with status code: {status} - {body}")]
    Auth { status: u16, body: String },

    /// Any authenticated call answered with 401
    #[error("invalid credentials [{status}] ({username}:{password_hint})")]
    InvalidCredentials {
        status: u16,
        username: String,
        password_hint: String,
    },

    /// Create hit an existing account; `user` is flagged as existing
    #[error("user {} already exists", .user.username)]
    UserAlreadyExists { user: Box<User> },

    /// An exact-match lookup returned more than one account
    #[error("ambiguous result - {count} users returned for username {username}")]
    AmbiguousResult {
        username: String,
        count: usize,
        user: Box<User>,
    },

    /// Requested, updated and re-fetched roles disagree after an update.
    /// `fetched` is `None` when the update response alone already disagreed.
    #[error(
        "updated and requested roles don't match for user {username}: requested {requested}, update returned {updated}{}",
        reported(.fetched)
    )]
    Consistency {
        username: String,
        requested: String,
        updated: String,
        fetched: Option<String>,
    },

    /// A response body was not valid XML for the expected payload
    #[error("unable to decode response body: {0}")]
    Decode(#[from] quick_xml::de::DeError),

    /// A request body could not be encoded
    #[error("unable to encode request body: {0}")]
    Encode(#[from] quick_xml::se::SeError),

    /// Any other non-success status
    #[error(
        "failed to {operation} - server responded with status code: {status}{}",
        describe(.detail, .body)
    )]
    Server {
        operation: &'static str,
        status: u16,
        body: String,
        detail: Option<ErrorDetail>,
    },

    /// Connection, TLS, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl TableauError {
    /// Partial user carried alongside the error, if any
    pub fn user(&self) -> Option<&User> {
        match self {
            TableauError::UserAlreadyExists { user } => Some(user.as_ref()),
            TableauError::AmbiguousResult { user, .. } => Some(user.as_ref()),
            _ => None,
        }
    }

    /// True when the error describes a terminal state rather than a failure
    pub fn is_nothing_to_do(&self) -> bool {
        matches!(self, TableauError::UserAlreadyExists { .. })
    }
}

fn describe(detail: &Option<ErrorDetail>, body: &str) -> String {
    match detail {
        Some(d) => format!(
            ", Code: {}, Summary: {}, Detail: {}",
            d.code, d.summary, d.detail
        ),
        None => format!(" - {}", body),
    }
}

fn reported(fetched: &Option<String>) -> String {
    match fetched {
        Some(role) => format!(", server reports {}", role),
        None => String::new(),
    }
}

/// Mask a password down to its first and last character.
///
/// `hunter2` becomes `h*****2`. Passwords shorter than two characters are
/// fully masked.
pub fn redact_password(password: &str) -> String {
    let mut chars = password.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => format!("{}*****{}", first, last),
        _ => "*****".to_string(),
    }
}

/// Type alias for Result with TableauError
pub type TableauResult<T> = Result<T, TableauError>;
