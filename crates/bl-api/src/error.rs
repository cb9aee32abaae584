//! HTTP error responses
//!
//! Engine errors carry their own status mapping ([`BlError::status_code`]);
//! this module only wraps them in a JSON body. Validation failures keep
//! their field map so clients can highlight the failing input.

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use bl_core::error::BlError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Anything the engine reported; status comes from the error itself.
    Engine(BlError),
    /// Caller identity headers missing or unparseable.
    Unauthorized(String),
    BadRequest(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl From<BlError> for ApiError {
    fn from(err: BlError) -> Self {
        ApiError::Engine(err)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Engine(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                }
                let errors = match &err {
                    BlError::Validation(v) => {
                        let mut map = v.errors.clone();
                        if !v.base_errors.is_empty() {
                            map.insert("base".into(), v.base_errors.clone());
                        }
                        Some(map)
                    }
                    _ => None,
                };
                (
                    status,
                    ErrorBody {
                        code: err.error_code(),
                        message: err.to_string(),
                        errors,
                    },
                )
            }
            ApiError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "unauthorized",
                    message,
                    errors: None,
                },
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "bad_request",
                    message,
                    errors: None,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_core::error::ValidationErrors;

    #[test]
    fn test_engine_error_status_mapping() {
        let err = ApiError::from(BlError::not_found("Milestone", 9));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let err = ApiError::from(BlError::invalid_state(
            "PaymentRequest",
            "APPROVED",
            "transition to REJECTED",
        ));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let mut validation = ValidationErrors::new();
        validation.add("amount", "must be greater than or equal to 0");
        let err = ApiError::from(BlError::Validation(validation));
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_unauthorized_status() {
        let err = ApiError::unauthorized("missing x-user-id header");
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
