//! Error taxonomy for the recommendation flow.
//!
//! Every upstream-facing failure is classified once into a `RecommendError`
//! before any retry decision is made. The retry controller only looks at
//! `status()` and `is_retriable()`.

use serde::Serialize;
use thiserror::Error;

/// HTTP statuses worth another attempt.
pub const RETRIABLE_STATUS_CODES: [u16; 7] = [408, 425, 429, 500, 502, 503, 504];

#[derive(Debug, Error)]
pub enum RecommendError {
    /// Missing or blank required input.
    #[error("{0}")]
    Validation(String),

    /// Missing credential or model identifier.
    #[error("{0}")]
    Configuration(String),

    /// HTTP-level failure (with status) or network failure (without status).
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },

    /// Prompt or response blocked by the upstream safety filters.
    #[error("{0}")]
    ContentPolicy(String),

    /// Generation stopped before producing any text (token limit, recitation...).
    #[error("{0}")]
    StoppedEarly(String),

    /// No candidates, or a candidate with no text and no explanation.
    #[error("{0}")]
    EmptyResult(String),

    #[error("The request was cancelled before a recommendation was ready.")]
    Cancelled,
}

impl RecommendError {
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        RecommendError::Upstream {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        RecommendError::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP-style status carried by the error, `None` for network failures
    /// and cancellation.
    pub fn status(&self) -> Option<u16> {
        match self {
            RecommendError::Validation(_) => Some(400),
            RecommendError::Configuration(_) => Some(500),
            RecommendError::Upstream { status, .. } => *status,
            RecommendError::ContentPolicy(_) => Some(400),
            RecommendError::StoppedEarly(_) => Some(400),
            RecommendError::EmptyResult(_) => Some(502),
            RecommendError::Cancelled => None,
        }
    }

    /// Status to answer the caller with.
    pub fn status_code(&self) -> u16 {
        match self {
            RecommendError::Cancelled => 503,
            other => other.status().unwrap_or(500),
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Validation and configuration problems never heal on their own, and a
    /// cancellation must propagate right away. Everything else is decided by
    /// its status, with a missing status treated as a network failure.
    pub fn is_retriable(&self) -> bool {
        match self {
            RecommendError::Cancelled
            | RecommendError::Validation(_)
            | RecommendError::Configuration(_) => false,
            other => match other.status() {
                Some(status) => RETRIABLE_STATUS_CODES.contains(&status),
                None => true,
            },
        }
    }

    pub fn classified(&self) -> ClassifiedError {
        ClassifiedError {
            message: self.to_string(),
            status_code: self.status_code(),
            retriable: self.is_retriable(),
        }
    }
}

/// Stable, serializable view of a `RecommendError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    pub message: String,
    pub status_code: u16,
    pub retriable: bool,
}
