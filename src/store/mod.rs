//! Transactional storage behind a unit-of-work interface.
//!
//! Services never talk to a connection directly. They call [`Store::begin`], run
//! their statements on the returned [`UnitOfWork`], and finish with
//! [`UnitOfWork::commit`]. A unit that is dropped or rolled back without a commit
//! leaves no trace, so a failing statement in the middle of a multi-table write
//! cannot leave partial state behind.
//!
//! Two engines implement the traits: [`PgStore`] for PostgreSQL and
//! [`MemoryStore`], an in-process engine used by the tests.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Email, Session, SessionId, Task, TaskId, User, UserId};

pub use memory::MemoryStore;
#[cfg(any(test, feature = "testing"))]
pub use memory::MemorySnapshot;
pub use postgres::PgStore;

/// Name of the unique constraint on `users.email`.
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// Name of the primary key constraint on `tasks.task_id`.
pub const TASKS_PKEY: &str = "tasks_pkey";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a storage engine.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Any database error not classified below.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    /// An insert collided with a unique constraint.
    #[error("duplicate key value violates unique constraint \"{constraint}\"")]
    UniqueViolation { constraint: String },
    /// A failure injected into the in-memory engine.
    #[error("injected failure in statement {0}")]
    Injected(Statement),
}

impl StoreError {
    /// Whether this error is a violation of the named unique constraint.
    pub fn violates(&self, name: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint == name)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() {
                return StoreError::UniqueViolation {
                    constraint: db_error.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        StoreError::Database(error)
    }
}

/// Every statement a unit of work can run. Used to name statements in logs
/// and to target fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    InsertUser,
    SelectUserByEmail,
    DeleteUser,
    InsertSession,
    SelectSession,
    DeleteSession,
    DeleteUserSessions,
    SelectUserTasks,
    InsertTask,
    UpdateTaskContent,
    UpdateTaskStatus,
    UpdateAllTaskStatus,
    DeleteTask,
    DeleteCompletedTasks,
    DeleteUserTasks,
    Commit,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Entry point to a storage engine.
#[async_trait]
pub trait Store: Send + Sync {
    /// Opens a new unit of work.
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
}

/// A set of statements that are committed or discarded together.
///
/// Nothing a unit writes is visible to other units until [`commit`](Self::commit)
/// succeeds. Dropping the unit without committing discards every write.
/// Mutations return the number of rows they affected.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn insert_user(&mut self, user: &User) -> StoreResult<()>;
    async fn user_by_email(&mut self, email: &Email) -> StoreResult<Option<User>>;
    async fn delete_user(&mut self, user_id: &UserId) -> StoreResult<u64>;

    async fn insert_session(&mut self, session: &Session) -> StoreResult<()>;
    async fn session(&mut self, session_id: &SessionId) -> StoreResult<Option<Session>>;
    async fn delete_session(&mut self, session_id: &SessionId) -> StoreResult<u64>;
    async fn delete_user_sessions(&mut self, user_id: &UserId) -> StoreResult<u64>;

    /// Tasks owned by `user_id`, in no particular order.
    async fn user_tasks(&mut self, user_id: &UserId) -> StoreResult<Vec<Task>>;
    async fn insert_task(&mut self, task: &Task) -> StoreResult<()>;
    async fn update_task_content(&mut self, task_id: &TaskId, content: &str) -> StoreResult<u64>;
    async fn update_task_status(&mut self, task_id: &TaskId, completed: bool) -> StoreResult<u64>;
    async fn update_all_task_status(&mut self, completed: bool) -> StoreResult<u64>;
    async fn delete_task(&mut self, task_id: &TaskId) -> StoreResult<u64>;
    async fn delete_completed_tasks(&mut self) -> StoreResult<u64>;
    async fn delete_user_tasks(&mut self, user_id: &UserId) -> StoreResult<u64>;

    /// Publishes every write made through this unit.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
    /// Discards every write made through this unit.
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
