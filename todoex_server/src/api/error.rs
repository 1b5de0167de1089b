//! Mapping of domain errors onto HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use todoex::{ErrorClass, auth::AuthError, todo::TodoError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by every handler and by the auth gate.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Todo(#[from] TodoError),

    /// Body or path could not be parsed
    #[error("{0}")]
    BadRequest(String),

    /// Authorization header absent or not a bearer credential
    #[error("{0}")]
    Unauthorized(&'static str),
}

impl ApiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::Auth(e) => e.class(),
            ApiError::Todo(e) => e.class(),
            ApiError::BadRequest(_) => ErrorClass::Validation,
            ApiError::Unauthorized(_) => ErrorClass::Authentication,
        }
    }

    fn client_message(&self) -> String {
        match self {
            ApiError::Auth(e) => e.client_message(),
            ApiError::Todo(e) => e.client_message(),
            other => other.to_string(),
        }
    }
}

/// Status code for an error class. Duplicate email is a plain 400.
pub fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::Validation | ErrorClass::Conflict => StatusCode::BAD_REQUEST,
        ErrorClass::Authentication => StatusCode::UNAUTHORIZED,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let class = self.class();
        if class == ErrorClass::Internal {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.client_message(),
        };
        (status_for(class), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
