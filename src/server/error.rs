//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::ScoutError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client
    pub fn public_message(&self) -> String {
        match self {
            ServerError::BadRequest(msg) | ServerError::NotFound(msg) => msg.clone(),
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                "An internal error occurred".to_string()
            }
        }
    }
}

impl From<ScoutError> for ServerError {
    fn from(err: ScoutError) -> Self {
        match err {
            ScoutError::InvalidInput(_) | ScoutError::ShapeError { .. } => {
                ServerError::BadRequest(err.to_string())
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": true,
            "message": self.public_message(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
