use crate::{
    auth::{Authorized, ManagerOnly, ManagerRequired, ManagersAndEmployees},
    error::AppError,
    models::{CreateTaskRequest, ListTasksQuery, TaskPath, UpdateTaskRequest},
    response,
    services::TaskService,
    validation,
};
use actix_web::{delete, get, http::StatusCode, post, put, web, HttpResponse};
use serde_json::{json, Value};

/// Lists the tasks visible to the caller.
///
/// Managers see every task, employees only those assigned to them.
///
/// ## Query Parameters:
/// - `limit` (1-100, default 10) and `offset` (default 0) select the window.
/// - `status`, `priority` (optional): equality filters.
/// - `sortBy` (`title`, `dueDate`, `priority`, `status`, `createdAt`; default `createdAt`)
///   and `order` (`asc`, `desc`; default `asc`).
///
/// ## Responses:
/// - `200 OK`: `{ tasks, totalCount, limit, offset, filters, sort }`; `totalCount`
///   counts every matching task, not just this page.
/// - `400 Bad Request`: one entry per invalid parameter.
#[get("")]
pub async fn list_tasks(
    auth: Authorized<ManagersAndEmployees>,
    tasks: web::Data<TaskService>,
    query: web::Query<ListTasksQuery>,
) -> Result<HttpResponse, AppError> {
    let user = auth.into_inner();
    let params = query.into_inner().into_params()?;

    let page = tasks.list_tasks(user.id, user.role, &params).await?;

    Ok(response::success(
        StatusCode::OK,
        "Tasks fetched successfully",
        Some(json!({
            "tasks": page.tasks,
            "totalCount": page.total_count,
            "limit": params.limit,
            "offset": params.offset,
            "filters": {
                "status": params.status,
                "priority": params.priority,
            },
            "sort": params.sort,
        })),
    ))
}

/// Creates a task assigned by the authenticated manager.
///
/// ## Responses:
/// - `201 Created`: the task, with `isApproved` false and `assignedById` set to the caller.
/// - `400 Bad Request`: one entry per invalid field, or an unknown `assignedToId`.
/// - `403 Forbidden`: the caller is not a manager, whatever the payload.
#[post("")]
pub async fn create_task(
    auth: Authorized<ManagerOnly>,
    tasks: web::Data<TaskService>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let manager = auth.into_inner();
    let draft = validation::from_json_body::<CreateTaskRequest>(body.into_inner())?.into_draft()?;

    let task = tasks.create_task(draft, manager.id).await?;

    Ok(response::success(
        StatusCode::CREATED,
        "Task created successfully",
        Some(task),
    ))
}

/// Retrieves a single task.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `400 Bad Request`: `id` is not a UUID.
/// - `403 Forbidden`: an employee asking for a task assigned to someone else.
/// - `404 Not Found`: no such task.
#[get("/{id}")]
pub async fn get_task(
    auth: Authorized<ManagersAndEmployees>,
    tasks: web::Data<TaskService>,
    path: web::Path<TaskPath>,
) -> Result<HttpResponse, AppError> {
    let user = auth.into_inner();
    let id = path.into_inner().into_id()?;

    let task = tasks.get_task_by_id(id, user.id, user.role).await?;

    Ok(response::success(
        StatusCode::OK,
        "Task fetched successfully",
        Some(task),
    ))
}

/// Partially updates a task. Only the fields present in the body change;
/// `null` clears `startDate` or `completeDate`.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `400 Bad Request`: bad `id` or invalid fields.
/// - `403 Forbidden`: an employee updating a task assigned to someone else.
/// - `404 Not Found`: no such task.
#[put("/{id}")]
pub async fn update_task(
    auth: Authorized<ManagersAndEmployees>,
    tasks: web::Data<TaskService>,
    path: web::Path<TaskPath>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let user = auth.into_inner();
    let id = path.into_inner().into_id()?;
    let changes =
        validation::from_json_body::<UpdateTaskRequest>(body.into_inner())?.into_changes()?;

    let task = tasks
        .update_task_by_id(id, user.id, user.role, changes)
        .await?;

    Ok(response::success(
        StatusCode::OK,
        "Task updated successfully",
        Some(task),
    ))
}

/// Deletes a task. Managers only.
///
/// ## Responses:
/// - `200 OK`: `data` is `null`.
/// - `400 Bad Request`: `id` is not a UUID.
/// - `403 Forbidden`: the caller is not a manager.
/// - `404 Not Found`: no such task.
#[delete("/{id}")]
pub async fn delete_task(
    auth: Authorized<ManagerRequired>,
    tasks: web::Data<TaskService>,
    path: web::Path<TaskPath>,
) -> Result<HttpResponse, AppError> {
    let manager = auth.into_inner();
    let id = path.into_inner().into_id()?;

    tasks.delete_task_by_id(id, manager.role).await?;

    Ok(response::success::<()>(
        StatusCode::OK,
        "Task deleted successfully",
        None,
    ))
}
