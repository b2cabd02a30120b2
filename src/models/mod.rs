pub mod task;
pub mod user;

pub use task::{
    CreateTaskRequest, ListTasksQuery, NewTask, SortField, SortOrder, Task, TaskChanges,
    TaskDraft, TaskFilter, TaskListParams, TaskPage, TaskPath, TaskPriority, TaskSort,
    TaskStatus, UpdateTaskRequest,
};
pub use user::{NewUser, PublicUser, Role, User};
