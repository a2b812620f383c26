use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::survey::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    /// The body never carries the store error, only the static message.
    #[error("Failed to save survey")]
    SurveySave(#[source] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload | AppError::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::SurveySave { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
