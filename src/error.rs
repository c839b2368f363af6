//!
//! # Error Taxonomy and Response Mapping
//!
//! This module defines `AppError`, the single failure type returned by every
//! service operation, and `ErrorKind`, the stable category each failure belongs to.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly. The mapping matches on `ErrorKind` to choose the HTTP status. Failures of
//! the `Internal` kind are logged with their full detail and replaced by a generic
//! message in the response body, so storage details never reach the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;
use crate::validate::Field;

/// Message sent to clients in place of any internal failure detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// Convenience alias used by services and handlers.
pub type AppResult<T> = Result<T, AppError>;

/// The externally visible category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field was missing or the request body could not be decoded.
    InvalidInput,
    /// No valid session, or bad credentials.
    Unauthorized,
    /// The lookup target does not exist.
    NotFound,
    /// The write conflicts with existing data, e.g. a registered email.
    Conflict,
    /// Storage or infrastructure failure. Never described to the client.
    Internal,
}

/// Every failure an operation can produce.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required field was empty after trimming.
    #[error("{0}")]
    InvalidInput(Field),
    /// The request body was not valid JSON for the operation.
    /// The decoder's message is kept for logging only.
    #[error("invalid json")]
    InvalidJson(String),
    /// The request has no session or the session did not resolve to a user.
    #[error("user is not authorized")]
    Unauthorized,
    /// Login with an unknown email or a wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The named record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Account creation with an email that is already registered.
    #[error("email already exists")]
    EmailExists,
    /// Task creation with an id that is already taken.
    #[error("task already exists")]
    TaskExists,
    /// A storage statement or transaction failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
    /// Any other unexpected failure, e.g. password hashing.
    #[error("internal failure: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidInput(_) | AppError::InvalidJson(_) => ErrorKind::InvalidInput,
            AppError::Unauthorized | AppError::InvalidCredentials => ErrorKind::Unauthorized,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::EmailExists | AppError::TaskExists => ErrorKind::Conflict,
            AppError::Storage(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The message that is safe to show to the client.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => INTERNAL_ERROR_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self.kind() {
            ErrorKind::Internal => error!("http error: {:?} (code={})", self, status.as_u16()),
            _ => warn!("http error: {} (code={})", self, status.as_u16()),
        }

        HttpResponse::build(status).json(json!({
            "error": self.public_message()
        }))
    }
}
