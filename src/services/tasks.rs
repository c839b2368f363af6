//! Task records.
//!
//! Listing and creation are scoped by the owner the gateway resolved from the
//! session; the owner is never taken from the request body. Edits, toggles and
//! deletes address a task by id alone, and the two bulk operations
//! (`toggle_all`, `clear_completed`) act on every user's tasks.

use std::sync::Arc;

use log::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Task, TaskId, UserId};
use crate::store::{Store, TASKS_PKEY};
use crate::validate::{required, Field};

pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All tasks owned by `user_id`, oldest first.
    pub async fn list_tasks(&self, user_id: &UserId) -> AppResult<Vec<Task>> {
        let user_id = UserId::from(required(user_id.as_str(), Field::UserId)?);

        let mut uow = self.store.begin().await?;
        let mut tasks = uow.user_tasks(&user_id).await?;
        uow.commit().await?;

        // Storage order is unspecified; ties keep a stable order by id.
        tasks.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }

    /// Creates a task for `user_id` and returns its id. A blank `task_id` gets a
    /// generated one. New tasks start out not completed. Fails with `TaskExists`
    /// if the id is taken, whoever owns that task.
    pub async fn create_task(
        &self,
        task_id: &TaskId,
        content: &str,
        user_id: &UserId,
    ) -> AppResult<TaskId> {
        let content = required(content, Field::TaskContent)?;
        let user_id = UserId::from(required(user_id.as_str(), Field::UserId)?);
        let task_id = match task_id.as_str().trim() {
            "" => TaskId::generate(),
            id => TaskId::from(id),
        };

        let task = Task::new(task_id, user_id, content);
        let mut uow = self.store.begin().await?;
        match uow.insert_task(&task).await {
            Ok(()) => {}
            Err(err) if err.violates(TASKS_PKEY) => return Err(AppError::TaskExists),
            Err(err) => return Err(err.into()),
        }
        uow.commit().await?;

        debug!("created task {} for user {}", task.id, task.owner);
        Ok(task.id)
    }

    /// Replaces a task's content. An id that matches no task is not an error.
    pub async fn edit_task(&self, task_id: &TaskId, new_content: &str) -> AppResult<()> {
        let task_id = TaskId::from(required(task_id.as_str(), Field::TaskId)?);
        let new_content = required(new_content, Field::TaskContent)?;

        let mut uow = self.store.begin().await?;
        let updated = uow.update_task_content(&task_id, new_content).await?;
        uow.commit().await?;

        debug!("edit of task {} updated {} row(s)", task_id, updated);
        Ok(())
    }

    pub async fn edit_task_status(&self, task_id: &TaskId, completed: bool) -> AppResult<()> {
        let task_id = TaskId::from(required(task_id.as_str(), Field::TaskId)?);

        let mut uow = self.store.begin().await?;
        let updated = uow.update_task_status(&task_id, completed).await?;
        uow.commit().await?;

        debug!("status of task {} set to {} ({} row(s))", task_id, completed, updated);
        Ok(())
    }

    /// Sets the completed flag on every task of every user.
    pub async fn toggle_all(&self, completed: bool) -> AppResult<()> {
        let mut uow = self.store.begin().await?;
        let updated = uow.update_all_task_status(completed).await?;
        uow.commit().await?;

        debug!("toggle all set {} task(s) to {}", updated, completed);
        Ok(())
    }

    /// Deletes a task if it exists. Deleting an absent task succeeds.
    pub async fn delete_task(&self, task_id: &TaskId) -> AppResult<()> {
        let task_id = TaskId::from(required(task_id.as_str(), Field::TaskId)?);

        let mut uow = self.store.begin().await?;
        let deleted = uow.delete_task(&task_id).await?;
        uow.commit().await?;

        debug!("delete of task {} removed {} row(s)", task_id, deleted);
        Ok(())
    }

    /// Deletes every completed task of every user.
    pub async fn clear_completed(&self) -> AppResult<()> {
        let mut uow = self.store.begin().await?;
        let deleted = uow.delete_completed_tasks().await?;
        uow.commit().await?;

        debug!("clear completed removed {} task(s)", deleted);
        Ok(())
    }
}
