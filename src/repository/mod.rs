//! Persistence ports.
//!
//! Services depend on these traits rather than on a database handle, so the
//! pool is injected once at startup and tests can substitute their own stores.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskChanges, TaskFilter, TaskSort, User};

pub use postgres::{PgTaskRepository, PgUserRepository};

#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persists a new user.
    ///
    /// # Errors
    /// * `Conflict` - the email is already registered
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync + 'static {
    async fn create(&self, task: NewTask) -> Result<Task, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Returns one window of the tasks matching `filter`, ordered by `sort`
    /// with ties broken by id.
    async fn list(
        &self,
        filter: &TaskFilter,
        sort: TaskSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, AppError>;

    /// Number of tasks matching `filter`, ignoring pagination.
    async fn count(&self, filter: &TaskFilter) -> Result<i64, AppError>;

    /// Applies `changes` and refreshes `updated_at`. `None` if the task does not exist.
    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError>;

    /// Returns `false` if there was nothing to delete.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
