//! Verification client errors.

use thiserror::Error;

/// Errors from the verification client.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The service timed out, was unreachable, or returned non-2xx.
    ///
    /// This is the only condition core scanning ever sees; the caller
    /// recovers with client-only results and never surfaces it to the
    /// user beyond a status indicator.
    #[error("verification service unavailable: {reason}")]
    ServiceUnavailable {
        /// What failed (timeout, transport, HTTP status)
        reason: String,
    },

    /// The service answered 2xx but the body was not the expected shape.
    #[error("invalid verification response: {0}")]
    InvalidResponse(String),

    /// HTTP client construction failed.
    #[error("internal verification error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for VerifyError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts and transport errors both degrade the same way.
        Self::ServiceUnavailable {
            reason: err.to_string(),
        }
    }
}

/// Result type alias using `VerifyError`.
pub type Result<T> = std::result::Result<T, VerifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_unavailable_display() {
        let err = VerifyError::ServiceUnavailable {
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "verification service unavailable: connection refused"
        );
    }
}
