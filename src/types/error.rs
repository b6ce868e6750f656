//! Error types for Karmicup
//!
//! Every variant maps to one HTTP status. User-facing variants carry a message
//! that names the missing precondition; storage and internal failures are
//! logged in full and reported to callers generically.

use hyper::StatusCode;

use crate::reddit::GatewayError;

/// Main error type for ledger operations
#[derive(Debug, thiserror::Error)]
pub enum KarmaError {
    /// Malformed request body, URL, or missing prerequisite on the caller's side
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthenticated,

    /// Local entity (account, submission) does not exist
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    /// Nothing new to credit, or the pair is already fully credited
    #[error("{0}")]
    Conflict(String),

    #[error("Not enough points. You need {required} pts.")]
    InsufficientBalance { required: i64 },

    /// Reddit could not be reached (network, 5xx, rate limit) after retries
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// Reddit itself reports the content as gone (a platform 404)
    #[error("{0}")]
    UpstreamNotFound(String),

    /// Reddit answered, but the response cannot be used for verification
    #[error("{0}")]
    Unverifiable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KarmaError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unverifiable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error detail is safe to show to the caller
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_) | Self::Config(_))
    }

    /// Message returned in the `error` field of a JSON response
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "Something went wrong. Please try again.".to_string()
        } else {
            self.to_string()
        }
    }

    /// Convert to status code and body tuple for HTTP response
    pub fn into_status_code_and_body(self) -> (StatusCode, String) {
        (self.status_code(), self.public_message())
    }

    /// Map a gateway failure onto the caller-facing taxonomy.
    ///
    /// `what` names the content being looked up, e.g. "Reddit post".
    pub fn from_gateway(err: GatewayError, what: &str) -> Self {
        match err {
            GatewayError::ClientError { status: 404, .. } => {
                Self::UpstreamNotFound(format!("{} not found. Please check the URL.", what))
            }
            GatewayError::Malformed(detail) => {
                Self::Unverifiable(format!("Could not read {} data from Reddit ({})", what, detail))
            }
            GatewayError::ClientError { .. } | GatewayError::Unavailable(_) => {
                Self::UpstreamUnavailable("Could not reach Reddit. Please try again.".to_string())
            }
        }
    }
}

// Implement From conversions for common error types

impl From<std::io::Error> for KarmaError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for KarmaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("Invalid JSON: {}", err))
    }
}

impl From<hyper::Error> for KarmaError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

impl From<mongodb::error::Error> for KarmaError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<bson::ser::Error> for KarmaError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Database(format!("BSON encoding failed: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for KarmaError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        Self::Unauthenticated
    }
}

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, KarmaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_are_masked() {
        let err = KarmaError::Database("E11000 duplicate key on user_submissions".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("E11000"));
    }

    #[test]
    fn test_user_errors_keep_their_message() {
        let err = KarmaError::InsufficientBalance { required: 10 };
        let (status, body) = err.into_status_code_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Not enough points. You need 10 pts.");
    }

    #[test]
    fn test_gateway_mapping() {
        let not_found = KarmaError::from_gateway(
            GatewayError::ClientError { status: 404, message: "gone".into() },
            "Reddit post",
        );
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert!(matches!(not_found, KarmaError::UpstreamNotFound(_)));

        let forbidden = KarmaError::from_gateway(
            GatewayError::ClientError { status: 403, message: "private".into() },
            "Reddit post",
        );
        assert_eq!(forbidden.status_code(), StatusCode::BAD_GATEWAY);

        let malformed = KarmaError::from_gateway(GatewayError::Malformed("no title".into()), "Reddit post");
        assert_eq!(malformed.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
