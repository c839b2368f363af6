#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Session-authenticated task lists: field validation, the user and task services,"]
#![doc = "the session gateway, storage engines, routing and the error-to-response mapping."]
#![doc = "The binary (`main.rs`) only loads configuration, connects storage and serves `routes::app`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validate;

pub use crate::error::{AppError, AppResult, ErrorKind};
pub use crate::state::{AppState, SessionSettings};
