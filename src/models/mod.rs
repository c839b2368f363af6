use serde::{Deserialize, Serialize};

/// Declares an opaque string identifier with the conversions the services need.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

pub mod session;
pub mod task;
pub mod user;

pub use session::{ExpiryTime, Session, SessionId};
pub use task::{
    CreateTaskRequest, EditTaskRequest, Task, TaskId, TaskStatusRequest, TasksResponse,
    ToggleAllRequest,
};
pub use user::{CreateUserRequest, Email, LoginRequest, User, UserId};

/// Success body carrying a human readable message.
#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub info: String,
}

impl InfoResponse {
    pub fn new(info: impl Into<String>) -> Self {
        Self { info: info.into() }
    }
}
