//! Error classification traits for caller-side retry decisions.
//!
//! The gateway never retries on its own. These traits let an error describe
//! itself so a caller can build whatever retry policy it needs.

use std::time::Duration;

/// Classification of error types for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient errors that may resolve on retry (network issues, timeouts)
    Transient,
    /// Permanent errors that won't resolve on retry (invalid input, rejected orders)
    Permanent,
    /// Resource exhaustion errors (rate limits)
    ResourceExhausted,
    /// Configuration errors (missing credentials, adapter not initialized)
    Configuration,
    /// Internal errors (unexpected response shapes, unmapped values)
    Internal,
}

/// Trait for errors that can classify themselves for retry logic.
///
/// # Example
///
/// ```rust,ignore
/// use trading_gateway::error::ErrorClassification;
///
/// async fn with_retry<T, E, F, Fut>(mut f: F) -> Result<T, E>
/// where
///     E: ErrorClassification,
///     F: FnMut() -> Fut,
///     Fut: std::future::Future<Output = Result<T, E>>,
/// {
///     let mut attempts = 0;
///     loop {
///         match f().await {
///             Ok(v) => return Ok(v),
///             Err(e) if e.is_transient() && attempts < e.max_retries() => {
///                 if let Some(delay) = e.suggested_retry_delay() {
///                     tokio::time::sleep(delay).await;
///                 }
///                 attempts += 1;
///             }
///             Err(e) => return Err(e),
///         }
///     }
/// }
/// ```
pub trait ErrorClassification {
    /// Returns the category of this error
    fn category(&self) -> ErrorCategory;

    /// Returns true if this error is transient and may succeed on retry
    fn is_transient(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transient | ErrorCategory::ResourceExhausted
        )
    }

    /// Returns true if this error is permanent and won't succeed on retry
    fn is_permanent(&self) -> bool {
        matches!(self.category(), ErrorCategory::Permanent)
    }

    /// Suggests a delay before retrying, if applicable
    fn suggested_retry_delay(&self) -> Option<Duration> {
        match self.category() {
            ErrorCategory::Transient => Some(Duration::from_millis(100)),
            ErrorCategory::ResourceExhausted => Some(Duration::from_secs(1)),
            _ => None,
        }
    }

    /// Returns the maximum number of retries suggested for this error
    fn max_retries(&self) -> u32 {
        match self.category() {
            ErrorCategory::Transient => 3,
            ErrorCategory::ResourceExhausted => 5,
            _ => 0,
        }
    }
}
