// Scam check API - Error handling
// Only input problems reach the caller; source failures become evidence-of-absence

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error("Missing input: enter a link, phone number or email")]
    EmptyInput,

    #[error("Invalid format: enter a URL, phone number or email")]
    UnclassifiableInput,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Internal(String),
}

// =============================================================================
// ERROR CONVERSIONS
// =============================================================================

impl From<validator::ValidationErrors> for CheckError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors
                    .iter()
                    .map(move |e| format!("{}: {}", field, e.message.as_ref().unwrap_or(&e.code)))
            })
            .collect();

        CheckError::InvalidRequest(messages.join(", "))
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        CheckError::InvalidRequest(format!("malformed JSON body: {}", err))
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckErrorResponse {
    pub error: String,
    pub code: String,
}

impl CheckError {
    /// Get HTTP status code for error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckError::EmptyInput
            | CheckError::UnclassifiableInput
            | CheckError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CheckError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            CheckError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CheckError::EmptyInput => "EMPTY_INPUT",
            CheckError::UnclassifiableInput => "UNCLASSIFIABLE_INPUT",
            CheckError::InvalidRequest(_) => "INVALID_REQUEST",
            CheckError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            CheckError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> CheckErrorResponse {
        CheckErrorResponse {
            error: self.to_string(),
            code: self.error_code().to_string(),
        }
    }
}

impl IntoResponse for CheckError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_response();

        (status, Json(body)).into_response()
    }
}

pub type CheckResult<T> = Result<T, CheckError>;
