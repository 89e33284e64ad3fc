//! Mapping from request and index failures to JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use title_index::IndexError;
use tracing::error;

use crate::users::UserError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    User(#[from] UserError),
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
    pub status: u16,
    pub timestamp: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Index(IndexError::InvalidArgument(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Index(IndexError::Inconsistent { .. } | IndexError::Poisoned) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::User(
                UserError::MissingFields | UserError::InvalidEmail | UserError::WeakPassword,
            ) => StatusCode::BAD_REQUEST,
            ApiError::User(UserError::EmailTaken) => StatusCode::CONFLICT,
            ApiError::User(UserError::InvalidCredentials | UserError::NotAuthenticated) => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(err = %self, "Request failed");
        }
        let body = ErrorBody {
            error: true,
            message: self.to_string(),
            status: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
