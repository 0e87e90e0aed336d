use crate::{
    auth::{
        access::{ensure_access, ensure_owner, AccessMode},
        AuthenticatedUser, MessageResponse,
    },
    error::AppError,
    models::{NewTask, ShareRequest, Task, TaskInput, TaskUpdate},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Maximum number of tasks returned by `GET /tasks`.
pub const TASK_LIST_LIMIT: usize = 10;

fn missing(task_id: Uuid) -> AppError {
    AppError::NotFound(format!("Task with task_id: {} does not exist", task_id))
}

/// Loads the task and checks the caller may use it in `mode`.
async fn load_accessible(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
    mode: AccessMode,
) -> Result<Task, AppError> {
    let task = state
        .store
        .find_task(task_id)
        .await?
        .ok_or_else(|| missing(task_id))?;
    ensure_access(&user.0, &task, mode)?;
    Ok(task)
}

/// Retrieves the tasks owned by the authenticated user.
///
/// Ownership is read from each task's `owner` field. At most
/// [`TASK_LIST_LIMIT`] tasks are returned, oldest first.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = state
        .store
        .list_tasks_by_owner(user.0.id, TASK_LIST_LIMIT)
        .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `name`: 1 to 200 characters.
/// - `due_date`: free-form string, up to 64 characters.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task` object as JSON.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If input validation on `TaskInput` fails.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = state
        .store
        .insert_task(NewTask::new(task_data.into_inner(), user.0.id))
        .await?;
    state.store.add_own_task(user.0.id, task.id).await?;

    log::info!("User {} created task {}", user.0.username, task.id);
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a task the caller owns or that was shared with them.
///
/// ## Responses:
/// - `200 OK`: Returns the `Task` object as JSON.
/// - `401 Unauthorized`: Invalid token, or the caller has no access to the task.
/// - `404 Not Found`: No task has this id.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = load_accessible(&state, &user, task_id.into_inner(), AccessMode::Read).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task.
///
/// The body may carry `name` and/or `due_date`; other fields are rejected.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task` object as JSON.
/// - `400 Bad Request`: The body names no field to update.
/// - `401 Unauthorized`: Invalid token, or the caller has no access to the task.
/// - `404 Not Found`: No task has this id.
/// - `422 Unprocessable Entity`: A field fails validation.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    if task_data.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }

    let task_id = task_id.into_inner();
    load_accessible(&state, &user, task_id, AccessMode::Write).await?;

    let task = state
        .store
        .update_task(task_id, task_data.into_inner())
        .await?
        .ok_or_else(|| missing(task_id))?;

    log::info!("User {} updated task {}", user.0.username, task.id);
    Ok(HttpResponse::Ok().json(task))
}

/// Shares a task with another user. Only the owner may share.
///
/// ## Request Body:
/// - `username`: the user to grant access to.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task` object as JSON.
/// - `400 Bad Request`: The owner tried to share with themselves.
/// - `401 Unauthorized`: Invalid token, or the caller is not the owner.
/// - `404 Not Found`: No task has this id, or the target user does not exist.
#[post("/{id}/share")]
pub async fn share_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    share: web::Json<ShareRequest>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let task = load_accessible(&state, &user, task_id, AccessMode::Write).await?;
    ensure_owner(&user.0, &task)?;

    let target = state
        .store
        .find_user_by_username(&share.username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} does not exist", share.username)))?;
    if target.id == user.0.id {
        return Err(AppError::BadRequest("Cannot share a task with yourself".into()));
    }

    let task = state
        .store
        .share_task(task_id, target.id)
        .await?
        .ok_or_else(|| missing(task_id))?;
    state.store.add_shared_task(target.id, task_id).await?;

    log::info!(
        "User {} shared task {} with {}",
        user.0.username,
        task_id,
        target.username
    );
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID. Allowed for the owner and for users it was shared with.
///
/// ## Responses:
/// - `200 OK`: Confirmation message.
/// - `401 Unauthorized`: Invalid token, or the caller has no access to the task.
/// - `404 Not Found`: No task has this id.
#[delete("/task/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    load_accessible(&state, &user, task_id, AccessMode::Write).await?;

    if state.store.delete_task(task_id).await? == 0 {
        return Err(missing(task_id));
    }

    log::info!("User {} deleted task {}", user.0.username, task_id);
    Ok(HttpResponse::Ok().json(MessageResponse::new(format!("Task {} deleted", task_id))))
}
