//! Request-boundary errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorBody;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No coordinates provided")]
    NoCoordinates,

    #[error("Invalid geometry type")]
    InvalidGeometryType,

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("No data available for the last checked months")]
    NoData,

    /// Anything that went wrong talking to the imagery service.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoCoordinates
            | AppError::InvalidGeometryType
            | AppError::InvalidCoordinates(_)
            | AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::NoData => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self);
        }

        let error = match &self {
            AppError::Upstream(e) => format!("{:#}", e),
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
