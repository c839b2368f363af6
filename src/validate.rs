//! Required-field checks shared by every mutating operation.
//!
//! All identifiers and content strings arrive from the client untrusted. Each one
//! is trimmed and, if nothing is left, rejected with a failure naming the field.
//! These checks run before any unit of work is opened, so bad input never
//! reaches storage.

use std::fmt;

use crate::error::AppError;

/// The user-supplied fields that must be present and non-blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TaskId,
    TaskContent,
    Email,
    Password,
    Session,
    ExpiryTime,
    UserId,
}

impl Field {
    /// Message returned to the client when the field is missing.
    pub fn required_message(self) -> &'static str {
        match self {
            Field::TaskId => "task id required",
            Field::TaskContent => "task content required",
            Field::Email => "email required",
            Field::Password => "password required",
            Field::Session => "session required",
            Field::ExpiryTime => "expiry time required",
            Field::UserId => "user id required",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.required_message())
    }
}

/// Trims `value` and returns the remainder, or `AppError::InvalidInput(field)`
/// if the value is empty after trimming.
pub fn required(value: &str, field: Field) -> Result<&str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(field));
    }
    Ok(trimmed)
}
