use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{
        CreateTaskRequest, EditTaskRequest, InfoResponse, TaskId, TaskStatusRequest,
        TasksResponse, ToggleAllRequest,
    },
    services::TaskService,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};

/// Lists the caller's tasks, oldest first.
///
/// ## Responses:
/// - `200 OK`: `{"tasks": [...]}`.
/// - `401 Unauthorized`: no valid session.
#[get("")]
pub async fn list_tasks(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = tasks.list_tasks(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(TasksResponse { tasks }))
}

/// Creates a task owned by the caller.
///
/// The owner always comes from the session. A missing `id` is generated.
///
/// ## Responses:
/// - `200 OK`: the task was created.
/// - `400 Bad Request`: content missing, or the body is not valid JSON.
/// - `409 Conflict`: a task with the given `id` already exists.
#[post("/create")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_data: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let CreateTaskRequest { id, content } = task_data.into_inner();
    tasks
        .create_task(&TaskId::from(id), &content, &user.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(InfoResponse::new(format!(
        "Task has been successfully created with content: {}",
        content.trim()
    ))))
}

#[post("/edit")]
pub async fn edit_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<EditTaskRequest>,
) -> Result<impl Responder, AppError> {
    let EditTaskRequest { id, content } = task_data.into_inner();
    tasks.edit_task(&TaskId::from(id), &content).await?;

    Ok(HttpResponse::Ok().json(InfoResponse::new(format!(
        "Task has been updated to content: {}",
        content.trim()
    ))))
}

#[post("/toggle")]
pub async fn toggle_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskStatusRequest>,
) -> Result<impl Responder, AppError> {
    let TaskStatusRequest { id, val } = task_data.into_inner();
    tasks.edit_task_status(&TaskId::from(id), val).await?;

    Ok(HttpResponse::Ok().json(InfoResponse::new(format!(
        "Task status has been set to {}",
        val
    ))))
}

/// Sets the completed flag on every stored task, not only the caller's.
#[post("/toggleAll")]
pub async fn toggle_all(
    tasks: web::Data<TaskService>,
    toggle_data: web::Json<ToggleAllRequest>,
) -> Result<impl Responder, AppError> {
    tasks.toggle_all(toggle_data.val).await?;
    Ok(HttpResponse::Ok().json(InfoResponse::new("Tasks have all been toggled.")))
}

#[delete("/delete/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    tasks.delete_task(&TaskId::from(task_id.into_inner())).await?;
    Ok(HttpResponse::Ok().json(InfoResponse::new("Task has been successfully deleted")))
}

/// Deletes every completed task, not only the caller's.
#[delete("/clearCompleted")]
pub async fn clear_completed(tasks: web::Data<TaskService>) -> Result<impl Responder, AppError> {
    tasks.clear_completed().await?;
    Ok(HttpResponse::Ok().json(InfoResponse::new(
        "Completed tasks have been succesfully deleted",
    )))
}
