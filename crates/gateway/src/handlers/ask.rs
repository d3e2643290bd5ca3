//! Question handlers
//!
//! Both routes always answer `200 {"response": ...}`; every failure,
//! including invalid input and timeouts, is reported in the text.

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::{Validate, ValidationError};

use crate::AppState;
use docqa_common::{errors::TIMEOUT_MESSAGE, metrics};

/// Reply for empty, blank or oversized input
pub const INVALID_INPUT_MESSAGE: &str = "Please enter a question between 1 and 2000 characters.";

/// Question request, sent as a form or as JSON
#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 2000), custom(function = "validate_not_blank"))]
    pub user_input: String,
}

/// Answer body
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Form endpoint used by the chat page
pub async fn get_response(
    State(state): State<AppState>,
    request: Result<Form<AskRequest>, FormRejection>,
) -> Json<AskResponse> {
    match request {
        Ok(Form(request)) => answer(&state, request, "/get_response").await,
        Err(rejection) => reject("/get_response", &rejection.body_text()),
    }
}

/// JSON endpoint
pub async fn ask(
    State(state): State<AppState>,
    request: Result<Json<AskRequest>, JsonRejection>,
) -> Json<AskResponse> {
    match request {
        Ok(Json(request)) => answer(&state, request, "/api/ask").await,
        Err(rejection) => reject("/api/ask", &rejection.body_text()),
    }
}

/// Body could not be decoded at all; answered like any other bad input
fn reject(endpoint: &str, reason: &str) -> Json<AskResponse> {
    let request_metrics = metrics::RequestMetrics::start("POST", endpoint);
    debug!(reason, "Undecodable question body");
    request_metrics.finish(200);
    Json(AskResponse {
        response: INVALID_INPUT_MESSAGE.to_string(),
    })
}

async fn answer(state: &AppState, request: AskRequest, endpoint: &str) -> Json<AskResponse> {
    let request_metrics = metrics::RequestMetrics::start("POST", endpoint);

    let response = match request.validate() {
        Ok(()) => respond_within_deadline(state, request.user_input.trim()).await,
        Err(e) => {
            debug!(error = %e, "Rejected question");
            INVALID_INPUT_MESSAGE.to_string()
        }
    };

    request_metrics.finish(200);
    Json(AskResponse { response })
}

async fn respond_within_deadline(state: &AppState, question: &str) -> String {
    let Some(limit) = state.config.request_timeout() else {
        return state.resolver.respond(question).await;
    };

    match tokio::time::timeout(limit, state.resolver.respond(question)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(timeout_secs = limit.as_secs(), "Question timed out");
            metrics::record_resolution_error("timeout");
            TIMEOUT_MESSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> AskRequest {
        AskRequest {
            user_input: text.to_string(),
        }
    }

    #[test]
    fn test_validation_bounds() {
        assert!(request("What is Java?").validate().is_ok());
        assert!(request(&"a".repeat(2000)).validate().is_ok());
        assert!(request("").validate().is_err());
        assert!(request("   ").validate().is_err());
        assert!(request(&"a".repeat(2001)).validate().is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(request(&"é".repeat(2000)).validate().is_ok());
    }
}
