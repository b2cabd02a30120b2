//! Business rules, independent of HTTP and of the storage engine.

pub mod auth;
pub mod tasks;

pub use auth::AuthService;
pub use tasks::TaskService;
