use actix_web::web;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::repository::{PgTaskRepository, PgUserRepository, TaskRepository, UserRepository};
use crate::services::{AuthService, TaskService};

/// Everything the HTTP layer needs, built once and cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub tasks: web::Data<TaskService>,
    pub tokens: TokenService,
}

impl AppState {
    /// Wires services over the given repositories.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        tokens: TokenService,
        hash_cost: u32,
    ) -> Self {
        Self {
            auth: web::Data::new(AuthService::new(users.clone(), tokens.clone(), hash_cost)),
            tasks: web::Data::new(TaskService::new(tasks, users)),
            tokens,
        }
    }

    /// Wires the PostgreSQL repositories over `pool`.
    pub fn with_pool(pool: sqlx::PgPool, config: &Config) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTaskRepository::new(pool)),
            TokenService::new(&config.jwt_secret, config.jwt_expiration_secs),
            config.bcrypt_cost,
        )
    }
}
