//! API error handling
//!
//! Service errors keep their status and error code; internal failures are
//! logged here and answered with a generic message.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use oo_auth::AuthError;
use oo_core::OoError;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by a service or contract
    Service(OoError),
    /// Body that could not be decoded at all
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<OoError> for ApiError {
    fn from(err: OoError) -> Self {
        ApiError::Service(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Service(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "errorIdentifier")]
    error_identifier: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Service(err) => {
                if err.is_internal() {
                    error!(error = %err, code = err.error_code(), "Request failed");
                }
                let errors = match err {
                    OoError::Validation(validation) => {
                        let mut fields: BTreeMap<String, Vec<String>> = validation
                            .errors
                            .iter()
                            .map(|(field, messages)| (field.clone(), messages.clone()))
                            .collect();
                        if !validation.base_errors.is_empty() {
                            fields.insert("base".into(), validation.base_errors.clone());
                        }
                        Some(fields)
                    }
                    _ => None,
                };
                ErrorBody {
                    message: err.public_message(),
                    error_identifier: err.error_code(),
                    errors,
                }
            }
            ApiError::BadRequest(msg) => ErrorBody {
                message: msg.clone(),
                error_identifier: "bad_request",
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
