use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskChanges, TaskFilter, TaskSort, User};
use crate::repository::{TaskRepository, UserRepository};

const USER_COLUMNS: &str = "id, name, email, password, role, created_at";

const TASK_COLUMNS: &str = "id, title, description, priority, assign_date, due_date, status, \
     start_date, complete_date, client, is_approved, assigned_to_id, assigned_by_id, \
     created_at, updated_at";

/// `UserRepository` over the `users` table.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, password, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

/// `TaskRepository` over the `tasks` table.
#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the `WHERE` clause for `filter`. Every value is bound, never interpolated.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
    query.push(" WHERE TRUE");
    if let Some(assignee) = filter.assigned_to_id {
        query.push(" AND assigned_to_id = ").push_bind(assignee);
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(priority) = filter.priority {
        query.push(" AND priority = ").push_bind(priority);
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task, AppError> {
        let created = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, title, description, priority, assign_date, due_date, status,
                                start_date, complete_date, client, is_approved, assigned_to_id,
                                assigned_by_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(task.title)
        .bind(task.description)
        .bind(task.priority)
        .bind(task.assign_date)
        .bind(task.due_date)
        .bind(task.status)
        .bind(task.start_date)
        .bind(task.complete_date)
        .bind(task.client)
        .bind(task.is_approved)
        .bind(task.assigned_to_id)
        .bind(task.assigned_by_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        sort: TaskSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM tasks", TASK_COLUMNS));
        push_filters(&mut query, filter);
        // Sort column and direction come from closed enums, so interpolation is safe here.
        query.push(format!(
            " ORDER BY {} {}, id ASC",
            sort.sort_by.column(),
            sort.order.keyword()
        ));
        query.push(" LIMIT ").push_bind(limit);
        query.push(" OFFSET ").push_bind(offset);

        let tasks = query.build_query_as::<Task>().fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn count(&self, filter: &TaskFilter) -> Result<i64, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        push_filters(&mut query, filter);

        let total = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = changes.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(description) = changes.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(priority) = changes.priority {
            query.push(", priority = ").push_bind(priority);
        }
        if let Some(assign_date) = changes.assign_date {
            query.push(", assign_date = ").push_bind(assign_date);
        }
        if let Some(due_date) = changes.due_date {
            query.push(", due_date = ").push_bind(due_date);
        }
        if let Some(status) = changes.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(start_date) = changes.start_date {
            query.push(", start_date = ").push_bind(start_date);
        }
        if let Some(complete_date) = changes.complete_date {
            query.push(", complete_date = ").push_bind(complete_date);
        }
        if let Some(client) = changes.client {
            query.push(", client = ").push_bind(client);
        }
        if let Some(is_approved) = changes.is_approved {
            query.push(", is_approved = ").push_bind(is_approved);
        }
        if let Some(assigned_to_id) = changes.assigned_to_id {
            query.push(", assigned_to_id = ").push_bind(assigned_to_id);
        }

        query.push(" WHERE id = ").push_bind(id);
        query.push(format!(" RETURNING {}", TASK_COLUMNS));

        let task = query
            .build_query_as::<Task>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
