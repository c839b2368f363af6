use serde::Deserialize;
use sqlx::FromRow;

string_id!(
    /// Opaque identifier of a user account.
    UserId
);

string_id!(
    /// Email address an account is registered under. Unique across all users.
    Email
);

impl UserId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// A user account as stored. The password is only ever held as a hash.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
}

/// Payload of the account-creation request.
///
/// Missing fields decode as empty strings so the service reports which field is required.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

/// Payload of the login request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
