//! Error taxonomy for the search pipeline.
//!
//! Every failure that can happen between a field change and a rendered
//! result is one of the four [`SearchError`] variants. None of them is fatal:
//! the orchestrator records them as an [`ErrorInfo`] in its state and the
//! form stays usable.
//!
//! | Variant | Raised by | Surfaces to the user |
//! |---------|-----------|----------------------|
//! | [`SearchError::Validation`] | [`crate::query`] | no, the search is silently skipped |
//! | [`SearchError::Api`] | [`crate::api`] | yes |
//! | [`SearchError::MalformedResponse`] | [`crate::api`] | yes |
//! | [`SearchError::Transport`] | [`crate::api`] | yes |

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A failure anywhere in the query → request → response path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The keyword was empty after trimming. Expected and common.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The API answered with a non-2xx status.
    #[error("news API returned HTTP {status}: {message}")]
    Api {
        status: u16,
        body: String,
        /// Human-readable text, taken from the error envelope when present.
        message: String,
    },

    /// 2xx, but the body does not match the expected envelope.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Connection, timeout or body-read failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::Validation(_) => ErrorKind::Validation,
            SearchError::Api { .. } => ErrorKind::Api,
            SearchError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            SearchError::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Flatten into the uniform value stored in `SearchState::last_error`.
    pub fn info(&self) -> ErrorInfo {
        let status = match self {
            SearchError::Api { status, .. } => Some(*status),
            _ => None,
        };
        ErrorInfo {
            kind: self.kind(),
            status,
            message: self.to_string(),
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        let what = if e.is_timeout() {
            "request timed out"
        } else if e.is_connect() {
            "could not connect"
        } else if e.is_body() || e.is_decode() {
            "failed reading response body"
        } else {
            "request failed"
        };
        SearchError::Transport(format!("{what}: {e}"))
    }
}

/// Discriminant of [`SearchError`], kept separately so state stays `Clone + Serialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    Api,
    MalformedResponse,
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Api => "api",
            ErrorKind::MalformedResponse => "malformed-response",
            ErrorKind::Transport => "transport",
        };
        f.write_str(s)
    }
}

/// The error value the presentation layer sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    /// HTTP status for [`ErrorKind::Api`], `None` otherwise.
    pub status: Option<u16>,
    pub message: String,
}
