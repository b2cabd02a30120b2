use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    NewTask, Role, Task, TaskChanges, TaskDraft, TaskFilter, TaskListParams, TaskPage,
};
use crate::repository::{TaskRepository, UserRepository};
use crate::validation::FieldError;

const NOT_ASSIGNED: &str = "Access denied: You are not assigned to this task";
const TASK_ROLES_REQUIRED: &str = "Access denied: Requires one of [MANAGER, EMPLOYEE] role";
const MANAGER_REQUIRED: &str = "Access denied: Requires MANAGER role";

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Who may see and edit a given task.
///
/// Managers see everything, employees only what is assigned to them, and
/// administrators hold no task privileges.
fn ensure_can_access(task: &Task, user_id: Uuid, role: Role) -> Result<(), AppError> {
    match role {
        Role::Manager => Ok(()),
        Role::Employee if task.assigned_to_id == user_id => Ok(()),
        Role::Employee => Err(AppError::Forbidden(NOT_ASSIGNED.into())),
        Role::Admin => Err(AppError::Forbidden(TASK_ROLES_REQUIRED.into())),
    }
}

/// Task CRUD with role-based visibility.
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { tasks, users }
    }

    async fn ensure_assignee_exists(&self, assignee: Uuid) -> Result<(), AppError> {
        match self.users.find_by_id(assignee).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation(vec![FieldError {
                field: "assignedToId".into(),
                message: "\"assignedToId\" must reference an existing user".into(),
            }])),
        }
    }

    /// Stores a new task created by `assigned_by_id`, filling in defaults:
    /// MEDIUM priority, TO_DO status, assigned now, not approved.
    pub async fn create_task(
        &self,
        draft: TaskDraft,
        assigned_by_id: Uuid,
    ) -> Result<Task, AppError> {
        self.ensure_assignee_exists(draft.assigned_to_id).await?;

        let task = self
            .tasks
            .create(NewTask {
                title: draft.title,
                description: draft.description,
                priority: draft.priority.unwrap_or_default(),
                assign_date: draft.assign_date.unwrap_or_else(Utc::now),
                due_date: draft.due_date,
                status: draft.status.unwrap_or_default(),
                start_date: draft.start_date,
                complete_date: draft.complete_date,
                client: draft.client,
                is_approved: false,
                assigned_to_id: draft.assigned_to_id,
                assigned_by_id,
            })
            .await?;

        log::info!(
            "Task {} created by {} for {}",
            task.id,
            assigned_by_id,
            task.assigned_to_id
        );
        Ok(task)
    }

    /// Lists the tasks visible to the caller. `total_count` covers the whole
    /// filtered set, not just the returned window.
    pub async fn list_tasks(
        &self,
        user_id: Uuid,
        role: Role,
        params: &TaskListParams,
    ) -> Result<TaskPage, AppError> {
        let assigned_to_id = match role {
            Role::Manager => None,
            Role::Employee => Some(user_id),
            Role::Admin => return Err(AppError::Forbidden(TASK_ROLES_REQUIRED.into())),
        };

        let filter = TaskFilter {
            assigned_to_id,
            status: params.status,
            priority: params.priority,
        };

        let tasks = self
            .tasks
            .list(&filter, params.sort, params.limit, params.offset)
            .await?;
        let total_count = self.tasks.count(&filter).await?;

        Ok(TaskPage { tasks, total_count })
    }

    pub async fn get_task_by_id(
        &self,
        id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<Task, AppError> {
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or_else(task_not_found)?;

        ensure_can_access(&task, user_id, role)?;
        Ok(task)
    }

    /// Applies a partial update after the same access check as `get_task_by_id`.
    pub async fn update_task_by_id(
        &self,
        id: Uuid,
        user_id: Uuid,
        role: Role,
        changes: TaskChanges,
    ) -> Result<Task, AppError> {
        self.get_task_by_id(id, user_id, role).await?;

        if let Some(assignee) = changes.assigned_to_id {
            self.ensure_assignee_exists(assignee).await?;
        }

        let task = self
            .tasks
            .update(id, changes)
            .await?
            .ok_or_else(task_not_found)?;

        log::info!("Task {} updated by {}", task.id, user_id);
        Ok(task)
    }

    pub async fn delete_task_by_id(&self, id: Uuid, role: Role) -> Result<(), AppError> {
        match role {
            Role::Manager => {}
            Role::Employee | Role::Admin => {
                return Err(AppError::Forbidden(MANAGER_REQUIRED.into()))
            }
        }

        if !self.tasks.delete(id).await? {
            return Err(task_not_found());
        }

        log::info!("Task {} deleted", id);
        Ok(())
    }
}
