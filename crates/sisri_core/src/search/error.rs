//! Caller-facing search errors.
//!
//! # Invariants
//! - `InvalidRequest` messages are safe to show to the caller.
//! - `Internal` never carries store error text; the detail is only logged,
//!   keyed by `request_id`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const SEARCH_TERM_REQUIRED: &str = "search term required";
pub const UNKNOWN_SEARCH_TYPE: &str = "unknown search type";
pub const INTERNAL_FAILURE_MESSAGE: &str = "error processing search";

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Missing or unsupported search type, or a missing required query term.
    InvalidRequest(&'static str),
    /// Unexpected store or data failure, already logged under `request_id`.
    Internal { request_id: Uuid },
}

impl SearchError {
    /// HTTP-style status for the caller.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::Internal { .. } => 500,
        }
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest(message) => message,
            Self::Internal { .. } => INTERNAL_FAILURE_MESSAGE,
        }
    }
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest(message) => write!(f, "invalid search request: {message}"),
            Self::Internal { .. } => write!(f, "{INTERNAL_FAILURE_MESSAGE}"),
        }
    }
}

impl Error for SearchError {}
