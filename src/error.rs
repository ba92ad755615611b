// error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Can't find device {0}")]
    DeviceNotFound(String),
    #[error("Can't find action {0}")]
    ActionNotFound(String),
    #[error("Value {0:?} is not a number")]
    NonNumericValue(String),
    #[error("Value {value} is out of range for {kind} device {device}")]
    InvalidValue {
        device: String,
        kind: String,
        value: i64,
    },
    #[error("Unknown device type {0:?}")]
    UnknownDeviceType(String),
    #[error("Action type {0:?} not implemented yet")]
    NotImplemented(String),
    #[error("Serial write failed: {0}")]
    Transport(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DeviceNotFound(_) | AppError::ActionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotImplemented(_) => StatusCode::NOT_FOUND,
            AppError::NonNumericValue(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidValue { .. }
            | AppError::UnknownDeviceType(_)
            | AppError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Transport(err) => error!(error = %err, "serial write failed"),
            other if status.is_server_error() => warn!(error = %other, "request rejected"),
            _ => {}
        }
        (status, self.to_string()).into_response()
    }
}
