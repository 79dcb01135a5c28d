//! Boundary translation from the domain error taxonomy to HTTP.
//!
//! The core never writes responses; every `AppError` passes through here
//! exactly once on its way out.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

use rf_core::error::AppError;

/// Newtype so we can hang actix's `ResponseError` on the domain error.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidReaction(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyLiked => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_, _) => StatusCode::NOT_FOUND,
            AppError::NothingToRemove => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = &self.0 {
            log::error!("internal failure surfaced as 500: {detail}");
        }
        HttpResponse::build(self.status_code()).json(json!({ "message": self.0.to_string() }))
    }
}
