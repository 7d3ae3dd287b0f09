//! Error types for billed-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use billed_core::{CoreError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e.code() {
                ErrorCode::FetchError | ErrorCode::UploadFailure | ErrorCode::SubmitFailure => {
                    StatusCode::BAD_GATEWAY
                }
                ErrorCode::NotSupported => StatusCode::METHOD_NOT_ALLOWED,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Core(ref e) => serde_json::to_value(e.to_details()).unwrap_or_default(),
        };
        log::warn!("request failed with {}: {}", status, body);
        (status, Json(body)).into_response()
    }
}
