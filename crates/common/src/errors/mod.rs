//! Error types for DocQA
//!
//! Two layers of errors live here:
//! - `ResolveError`: one variant per failure surface of the answer pipeline,
//!   carried through every stage and turned into user text only at the end
//! - `AppError`: service-level failures (configuration, startup, rate limits) with
//!   HTTP status mapping for non-QA routes
//!
//! `QuestionBankError` covers loading the curated Q&A file.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Shown when the question names something the document never mentions
pub fn not_found_message(term: &str) -> String {
    format!("Sorry, I don't have information about {}", term)
}

/// Shown when the term is present but no chunk could be gathered for it
pub fn no_passage_message(term: &str) -> String {
    format!("Sorry, I couldn't find a passage about {} to summarize", term)
}

/// Generic reply for infrastructure failures
pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "Sorry, an unexpected error occurred. Please try again later.";

/// Reply when the caller-side request timeout fires
pub const TIMEOUT_MESSAGE: &str = "Sorry, answering took too long. Please try again.";

/// Failures of a single resolution attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The source document could not be decoded to text
    #[error("Error extracting text from document {path}: {message}")]
    Extraction { path: String, message: String },

    /// Entity extraction failed; no annotation means no routing
    #[error("Error analyzing input: {message}")]
    Analysis { message: String },

    /// The summarizer call failed
    #[error("Error generating bot response: {message}")]
    Summarization { message: String },

    /// The generator call failed
    #[error("Error generating bot response: {message}")]
    Generation { message: String },
}

impl ResolveError {
    /// Convert into the plain-language text returned to the user.
    ///
    /// Document and model failures surface their own message. Analysis
    /// failures are infrastructure faults and get the generic reply.
    pub fn user_message(&self) -> String {
        match self {
            ResolveError::Extraction { .. }
            | ResolveError::Summarization { .. }
            | ResolveError::Generation { .. } => self.to_string(),
            ResolveError::Analysis { .. } => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::Extraction { .. } => "extraction",
            ResolveError::Analysis { .. } => "analysis",
            ResolveError::Summarization { .. } => "summarization",
            ResolveError::Generation { .. } => "generation",
        }
    }
}

/// Failures loading the curated question bank
#[derive(Error, Debug)]
pub enum QuestionBankError {
    #[error("Question bank not found: {path}")]
    NotFound { path: String },

    #[error("Malformed question bank {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read question bank {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RateLimited,
    QuestionBankError,
    ConfigurationError,
    InternalError,
}

/// Reply when the rate limiter rejects a question
pub const RATE_LIMITED_MESSAGE: &str =
    "Sorry, too many questions right now. Please wait a moment and try again.";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    #[error("Question bank error: {0}")]
    QuestionBank(#[from] QuestionBankError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::QuestionBank(_) => ErrorCode::QuestionBankError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::QuestionBank(_)
            | AppError::Configuration { .. }
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-language text for the chat page
    pub fn user_message(&self) -> String {
        match self {
            AppError::RateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            _ => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API.
///
/// `response` mirrors the answer body so the chat page can always show it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub response: String,
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            response: self.user_message(),
            error: ErrorDetails { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_unexpected_are_distinguishable() {
        let not_found = not_found_message("Python");
        assert_eq!(not_found, "Sorry, I don't have information about Python");
        assert_ne!(not_found, UNEXPECTED_ERROR_MESSAGE);
        assert!(!UNEXPECTED_ERROR_MESSAGE.contains("don't have information"));
    }

    #[test]
    fn test_analysis_error_uses_generic_message() {
        let err = ResolveError::Analysis {
            message: "bad input".into(),
        };
        assert_eq!(err.user_message(), UNEXPECTED_ERROR_MESSAGE);
        assert_eq!(err.kind(), "analysis");
    }

    #[test]
    fn test_extraction_error_surfaces_its_message() {
        let err = ResolveError::Extraction {
            path: "java.pdf".into(),
            message: "Failed to load PDF".into(),
        };
        let message = err.user_message();
        assert!(message.contains("java.pdf"));
        assert!(message.contains("Failed to load PDF"));
    }

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::QuestionBank(QuestionBankError::NotFound {
            path: "data.json".into(),
        });
        assert_eq!(err.code(), ErrorCode::QuestionBankError);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
        assert_eq!(err.user_message(), UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn test_rate_limited_is_client_error() {
        let err = AppError::RateLimited { limit: 20 };
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert!(err.is_client_error());
        assert_eq!(err.user_message(), RATE_LIMITED_MESSAGE);
    }

    #[tokio::test]
    async fn test_error_body_carries_response_text() {
        let response = AppError::RateLimited { limit: 1 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.response, RATE_LIMITED_MESSAGE);
        assert_eq!(body.error.code, ErrorCode::RateLimited);
    }
}
