//! JSON body handling for endpoints that must answer malformed input
//! with a structured error instead of axum's plain-text rejection.

use axum::Json;
use axum::extract::rejection::JsonRejection;

use portal_core::error::AppError;
use portal_core::result::AppResult;

/// Unwraps an optional-rejection JSON extractor into a malformed-input error.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::malformed(rejection.body_text()))
}
