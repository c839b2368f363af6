use async_trait::async_trait;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use super::{Store, StoreResult, UnitOfWork};
use crate::models::{Email, Session, SessionId, Task, TaskId, User, UserId};

const TASK_COLUMNS: &str =
    "task_id AS id, user_id AS owner, content, completed, created_at AS timestamp";

/// Statements run by [`PgStore::provision`]. Every one is idempotent.
const SCHEMA: &[&str] = &[
    "CREATE SCHEMA IF NOT EXISTS todo",
    "CREATE TABLE IF NOT EXISTS todo.users (
        user_id TEXT PRIMARY KEY,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        CONSTRAINT users_email_key UNIQUE (email)
    )",
    "CREATE TABLE IF NOT EXISTS todo.sessions (
        session_id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        expiry_time TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS todo.tasks (
        task_id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        content TEXT NOT NULL,
        completed BOOL NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS sessions_user_id_idx ON todo.sessions (user_id)",
    "CREATE INDEX IF NOT EXISTS tasks_user_id_created_at_idx ON todo.tasks (user_id, created_at)",
];

/// PostgreSQL engine. Each unit of work is one database transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool of at most `max_connections` connections.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates the `todo` schema and its tables if they do not exist yet.
    pub async fn provision(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("database schema is ready");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// Wraps a transaction. sqlx rolls the transaction back if it is dropped uncommitted.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        sqlx::query("INSERT INTO todo.users (user_id, email, password_hash) VALUES ($1, $2, $3)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn user_by_email(&mut self, email: &Email) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id AS id, email, password_hash FROM todo.users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(user)
    }

    async fn delete_user(&mut self, user_id: &UserId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todo.users WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_session(&mut self, session: &Session) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO todo.sessions (session_id, user_id, expiry_time) VALUES ($1, $2, $3)",
        )
        .bind(&session.session_id)
        .bind(&session.user_id)
        .bind(&session.expiry_time)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn session(&mut self, session_id: &SessionId) -> StoreResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT session_id, user_id, expiry_time FROM todo.sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(session)
    }

    async fn delete_session(&mut self, session_id: &SessionId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todo.sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_user_sessions(&mut self, user_id: &UserId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todo.sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn user_tasks(&mut self, user_id: &UserId) -> StoreResult<Vec<Task>> {
        let sql = format!("SELECT {} FROM todo.tasks WHERE user_id = $1", TASK_COLUMNS);
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(tasks)
    }

    async fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        // created_at and completed come from the column defaults.
        sqlx::query("INSERT INTO todo.tasks (task_id, user_id, content) VALUES ($1, $2, $3)")
            .bind(&task.id)
            .bind(&task.owner)
            .bind(&task.content)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn update_task_content(&mut self, task_id: &TaskId, content: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE todo.tasks SET content = $1 WHERE task_id = $2")
            .bind(content)
            .bind(task_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn update_task_status(&mut self, task_id: &TaskId, completed: bool) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE todo.tasks SET completed = $1 WHERE task_id = $2")
            .bind(completed)
            .bind(task_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn update_all_task_status(&mut self, completed: bool) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE todo.tasks SET completed = $1")
            .bind(completed)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_task(&mut self, task_id: &TaskId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todo.tasks WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_completed_tasks(&mut self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todo.tasks WHERE completed = true")
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_user_tasks(&mut self, user_id: &UserId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todo.tasks WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
