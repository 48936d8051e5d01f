//! Venue error types with error classification.
//!
//! Every adapter operation returns [`VenueResult`]. Failures are typed and
//! propagate to the immediate caller; nothing inside an adapter swallows or
//! retries them.

mod traits;

pub use traits::{ErrorCategory, ErrorClassification};

use std::time::Duration;
use thiserror::Error;

use crate::vocabulary::VenueId;

/// Result type for venue operations.
pub type VenueResult<T> = Result<T, VenueError>;

/// Errors that can occur during venue operations.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum VenueError {
    /// Connection, DNS or timeout failure before a response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// The venue answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Venue error code embedded in the body, when present
        code: Option<String>,
        /// Venue message or raw body
        message: String,
    },

    /// HTTP succeeded but the venue reported a failure code
    #[error("Venue error [{code}]: {message}")]
    Api {
        /// Venue error code
        code: String,
        /// Venue error message
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// The venue returned a value outside the known mapping table
    #[error("{venue} returned unmapped {kind} value '{raw}'")]
    UnmappedEnum {
        /// Venue that produced the value
        venue: VenueId,
        /// Which vocabulary the value belongs to (side, status, ...)
        kind: &'static str,
        /// Raw wire value
        raw: String,
    },

    /// The venue cannot express the requested operation or value
    #[error("{venue} does not support {operation}")]
    Unsupported {
        /// Venue that rejected the operation
        venue: VenueId,
        /// Operation or canonical value that has no venue counterpart
        operation: String,
    },

    /// A multi-step batch stopped part way through
    #[error("Batch stopped after {} completed item(s): {source}", .completed.len())]
    PartialBatch {
        /// Identifiers placed or canceled before the failure, in order
        completed: Vec<String>,
        /// The failure that stopped the batch
        #[source]
        source: Box<VenueError>,
    },

    /// An operation was issued before `init`
    #[error("{0} adapter is not initialized")]
    NotInitialized(VenueId),

    /// `init` was called twice
    #[error("{0} adapter is already initialized")]
    AlreadyInitialized(VenueId),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller supplied arguments the venue cannot accept
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No adapter is registered under the requested identifier
    #[error("Unknown venue: {0}")]
    VenueNotFound(String),

    /// A requested record (asset, chain, order) is missing from the response
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ErrorClassification for VenueError {
    fn category(&self) -> ErrorCategory {
        match self {
            VenueError::Transport(_) => ErrorCategory::Transient,
            VenueError::Http { status, .. } => match status {
                429 | 418 => ErrorCategory::ResourceExhausted,
                401 | 403 => ErrorCategory::Configuration,
                500..=599 => ErrorCategory::Transient,
                _ => ErrorCategory::Permanent,
            },
            VenueError::Api { code, .. } => match code.as_str() {
                // OKX: too many requests / Binance: too many orders
                "50011" | "-1015" => ErrorCategory::ResourceExhausted,
                // OKX: system busy / Binance: timestamp outside recvWindow
                "50001" | "50013" | "-1021" => ErrorCategory::Transient,
                _ => ErrorCategory::Permanent,
            },
            VenueError::Decode(_) | VenueError::UnmappedEnum { .. } => ErrorCategory::Internal,
            VenueError::Unsupported { .. } => ErrorCategory::Permanent,
            VenueError::PartialBatch { source, .. } => source.category(),
            VenueError::NotInitialized(_)
            | VenueError::AlreadyInitialized(_)
            | VenueError::Configuration(_) => ErrorCategory::Configuration,
            VenueError::InvalidRequest(_)
            | VenueError::VenueNotFound(_)
            | VenueError::NotFound(_) => ErrorCategory::Permanent,
        }
    }

    fn suggested_retry_delay(&self) -> Option<Duration> {
        match self {
            VenueError::Http { status: 429, .. } => Some(Duration::from_secs(60)),
            VenueError::Http { status: 418, .. } => Some(Duration::from_secs(120)),
            VenueError::Transport(_) => Some(Duration::from_millis(500)),
            VenueError::PartialBatch { source, .. } => source.suggested_retry_delay(),
            _ => match self.category() {
                ErrorCategory::Transient => Some(Duration::from_millis(100)),
                ErrorCategory::ResourceExhausted => Some(Duration::from_secs(1)),
                _ => None,
            },
        }
    }
}

impl VenueError {
    /// Create a venue API error.
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(venue: VenueId, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            venue,
            operation: operation.into(),
        }
    }

    /// Wrap `source` with the identifiers completed before it occurred.
    ///
    /// With nothing completed the source error is returned unchanged.
    pub fn partial_batch(completed: Vec<String>, source: VenueError) -> Self {
        if completed.is_empty() {
            source
        } else {
            Self::PartialBatch {
                completed,
                source: Box::new(source),
            }
        }
    }

    /// Split a batch error into the identifiers it completed and the
    /// underlying failure. Other errors completed nothing.
    pub fn into_partial(self) -> (Vec<String>, VenueError) {
        match self {
            VenueError::PartialBatch { completed, source } => (completed, *source),
            other => (Vec::new(), other),
        }
    }

    /// Returns the venue error code if available.
    pub fn venue_code(&self) -> Option<&str> {
        match self {
            VenueError::Api { code, .. } => Some(code),
            VenueError::Http { code, .. } => code.as_deref(),
            VenueError::PartialBatch { source, .. } => source.venue_code(),
            _ => None,
        }
    }

    /// Identifiers completed before a batch failure (empty for other errors).
    pub fn completed_ids(&self) -> &[String] {
        match self {
            VenueError::PartialBatch { completed, .. } => completed,
            _ => &[],
        }
    }

    /// Returns true if this is an unsupported-operation error.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, VenueError::Unsupported { .. })
    }
}

impl From<reqwest::Error> for VenueError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VenueError::Transport(format!("request timed out: {}", err))
        } else if err.is_decode() {
            VenueError::Decode(err.to_string())
        } else {
            VenueError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for VenueError {
    fn from(err: serde_json::Error) -> Self {
        VenueError::Decode(err.to_string())
    }
}
