use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Statement, Store, StoreError, StoreResult, UnitOfWork, TASKS_PKEY, USERS_EMAIL_KEY};
use crate::models::{Email, Session, SessionId, Task, TaskId, User, UserId};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    sessions: HashMap<SessionId, Session>,
    tasks: HashMap<TaskId, Task>,
}

/// In-process engine with the same tables as the PostgreSQL schema.
///
/// A unit of work holds the engine lock for its whole lifetime and writes to a
/// private copy of the tables, which replaces the shared tables on commit. Units
/// are therefore serializable. Rows are kept in hash maps, so reads come back in
/// arbitrary order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_on: Option<Statement>,
}

/// Copy of the committed rows, for assertions.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    pub users: Vec<User>,
    pub sessions: Vec<Session>,
    pub tasks: Vec<Task>,
}

#[cfg(any(test, feature = "testing"))]
impl MemorySnapshot {
    pub fn users_with_email(&self, email: &str) -> usize {
        self.users.iter().filter(|u| u.email.as_str() == email).count()
    }

    pub fn sessions_of(&self, user_id: &UserId) -> usize {
        self.sessions.iter().filter(|s| &s.user_id == user_id).count()
    }

    pub fn tasks_of(&self, user_id: &UserId) -> usize {
        self.tasks.iter().filter(|t| &t.owner == user_id).count()
    }

    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == task_id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every execution of `statement` fail with [`StoreError::Injected`].
    /// The handle shares its tables with the store it was derived from.
    #[cfg(any(test, feature = "testing"))]
    pub fn fail_on(&self, statement: Statement) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            fail_on: Some(statement),
        }
    }

    /// Inserts `task` as-is, keeping its timestamp.
    #[cfg(any(test, feature = "testing"))]
    pub async fn seed_task(&self, task: Task) {
        let mut tables = self.tables.lock().await;
        tables.tasks.insert(task.id.clone(), task);
    }

    #[cfg(any(test, feature = "testing"))]
    pub async fn snapshot(&self) -> MemorySnapshot {
        let tables = self.tables.lock().await;
        MemorySnapshot {
            users: tables.users.values().cloned().collect(),
            sessions: tables.sessions.values().cloned().collect(),
            tasks: tables.tasks.values().cloned().collect(),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = Tables::clone(&guard);
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            working,
            fail_on: self.fail_on,
        }))
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    fail_on: Option<Statement>,
}

impl MemoryUnitOfWork {
    fn run(&self, statement: Statement) -> StoreResult<()> {
        if self.fail_on == Some(statement) {
            return Err(StoreError::Injected(statement));
        }
        Ok(())
    }
}

fn removed<K, V>(map: &mut HashMap<K, V>, keep: impl Fn(&V) -> bool) -> u64 {
    let before = map.len();
    map.retain(|_, v| keep(v));
    (before - map.len()) as u64
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        self.run(Statement::InsertUser)?;
        if self.working.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation {
                constraint: USERS_EMAIL_KEY.to_string(),
            });
        }
        if self.working.users.contains_key(&user.id) {
            return Err(StoreError::UniqueViolation {
                constraint: "users_pkey".to_string(),
            });
        }
        self.working.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn user_by_email(&mut self, email: &Email) -> StoreResult<Option<User>> {
        self.run(Statement::SelectUserByEmail)?;
        Ok(self.working.users.values().find(|u| &u.email == email).cloned())
    }

    async fn delete_user(&mut self, user_id: &UserId) -> StoreResult<u64> {
        self.run(Statement::DeleteUser)?;
        Ok(self.working.users.remove(user_id).map_or(0, |_| 1))
    }

    async fn insert_session(&mut self, session: &Session) -> StoreResult<()> {
        self.run(Statement::InsertSession)?;
        if self.working.sessions.contains_key(&session.session_id) {
            return Err(StoreError::UniqueViolation {
                constraint: "sessions_pkey".to_string(),
            });
        }
        self.working
            .sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn session(&mut self, session_id: &SessionId) -> StoreResult<Option<Session>> {
        self.run(Statement::SelectSession)?;
        Ok(self.working.sessions.get(session_id).cloned())
    }

    async fn delete_session(&mut self, session_id: &SessionId) -> StoreResult<u64> {
        self.run(Statement::DeleteSession)?;
        Ok(self.working.sessions.remove(session_id).map_or(0, |_| 1))
    }

    async fn delete_user_sessions(&mut self, user_id: &UserId) -> StoreResult<u64> {
        self.run(Statement::DeleteUserSessions)?;
        Ok(removed(&mut self.working.sessions, |s| &s.user_id != user_id))
    }

    async fn user_tasks(&mut self, user_id: &UserId) -> StoreResult<Vec<Task>> {
        self.run(Statement::SelectUserTasks)?;
        Ok(self
            .working
            .tasks
            .values()
            .filter(|t| &t.owner == user_id)
            .cloned()
            .collect())
    }

    async fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        self.run(Statement::InsertTask)?;
        if self.working.tasks.contains_key(&task.id) {
            return Err(StoreError::UniqueViolation {
                constraint: TASKS_PKEY.to_string(),
            });
        }
        let mut row = task.clone();
        row.completed = false;
        row.timestamp = Utc::now();
        self.working.tasks.insert(row.id.clone(), row);
        Ok(())
    }

    async fn update_task_content(&mut self, task_id: &TaskId, content: &str) -> StoreResult<u64> {
        self.run(Statement::UpdateTaskContent)?;
        Ok(match self.working.tasks.get_mut(task_id) {
            Some(task) => {
                task.content = content.to_string();
                1
            }
            None => 0,
        })
    }

    async fn update_task_status(&mut self, task_id: &TaskId, completed: bool) -> StoreResult<u64> {
        self.run(Statement::UpdateTaskStatus)?;
        Ok(match self.working.tasks.get_mut(task_id) {
            Some(task) => {
                task.completed = completed;
                1
            }
            None => 0,
        })
    }

    async fn update_all_task_status(&mut self, completed: bool) -> StoreResult<u64> {
        self.run(Statement::UpdateAllTaskStatus)?;
        for task in self.working.tasks.values_mut() {
            task.completed = completed;
        }
        Ok(self.working.tasks.len() as u64)
    }

    async fn delete_task(&mut self, task_id: &TaskId) -> StoreResult<u64> {
        self.run(Statement::DeleteTask)?;
        Ok(self.working.tasks.remove(task_id).map_or(0, |_| 1))
    }

    async fn delete_completed_tasks(&mut self) -> StoreResult<u64> {
        self.run(Statement::DeleteCompletedTasks)?;
        Ok(removed(&mut self.working.tasks, |t| !t.completed))
    }

    async fn delete_user_tasks(&mut self, user_id: &UserId) -> StoreResult<u64> {
        self.run(Statement::DeleteUserTasks)?;
        Ok(removed(&mut self.working.tasks, |t| &t.owner != user_id))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.run(Statement::Commit)?;
        let MemoryUnitOfWork {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
