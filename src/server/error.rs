//! HTTP error responses, rendered in whichever format the client asked for.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;

use crate::pod::PodError;
use crate::server::negotiate::ResponseFormat;
use crate::server::pages;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error on its way to the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub format: ResponseFormat,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, format: ResponseFormat) -> Self {
        ApiError {
            status,
            message: message.into(),
            format,
        }
    }

    pub fn not_found(format: ResponseFormat) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, "not found", format)
    }

    pub fn internal(format: ResponseFormat) -> Self {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            format,
        )
    }

    /// Maps a registry error onto a status code. Storage details are logged, not sent.
    pub fn from_pod(err: PodError, format: ResponseFormat) -> Self {
        let status = match &err {
            PodError::NotFound(_) | PodError::StudentNotFound(_) => StatusCode::NOT_FOUND,
            PodError::Exhausted { .. } | PodError::PodTaken(_) => StatusCode::CONFLICT,
            PodError::InvalidPod(_) | PodError::InvalidUsername => StatusCode::BAD_REQUEST,
            PodError::CorruptSnapshot(_) | PodError::Storage(_) => {
                error!("Registry operation failed: {}", err);
                return ApiError::internal(format);
            }
        };
        ApiError::new(status, err.to_string(), format)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.format {
            ResponseFormat::Json => (
                self.status,
                Json(ErrorResponse {
                    error: self.message,
                }),
            )
                .into_response(),
            ResponseFormat::Html => (
                self.status,
                Html(pages::error_page(self.status, &self.message)),
            )
                .into_response(),
        }
    }
}
