//! Bearer-token extractor: turns the Authorization header into an `Actor`
//! before any handler body runs. Missing or bad tokens short-circuit to 401.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::error::ApiError;
use crate::AppState;
use rf_core::error::AppError;
use rf_core::models::Actor;

/// Wrapper so the foreign `Actor` type can implement `FromRequest`.
pub struct AuthedActor(pub Actor);

impl FromRequest for AuthedActor {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_actor(req))
    }
}

fn extract_actor(req: &HttpRequest) -> Result<AuthedActor, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError(AppError::Internal("application state missing".to_string())))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError(AppError::Unauthorized("missing bearer token".to_string())))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError(AppError::Unauthorized("malformed authorization header".to_string())))?;

    let actor = state.auth.verify_token(token)?;
    Ok(AuthedActor(actor))
}
