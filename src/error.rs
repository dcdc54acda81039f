use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid pin number: {0}")]
    InvalidPin(String),
    #[error("Pin {0} is already in use")]
    PinInUse(u32),
    #[error("Direction error: {0}")]
    Direction(String),
    #[error("Functionality not implemented yet: {0}")]
    NotImplemented(&'static str),
    #[error("Device not found: {0}")]
    NotFoundDevice(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("GPIO error: {0}")]
    Gpio(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFoundDevice(_) => StatusCode::NOT_FOUND,
            AppError::InvalidPin(_) | AppError::Direction(_) | AppError::InvalidValue(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::PinInUse(_) => StatusCode::CONFLICT,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Config(_) | AppError::Gpio(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
