pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::state::AppState;
use crate::validation::FieldError;

/// Extractor failures get a fixed message; the parser detail only goes to the log.
fn malformed(field: &str, message: &str, detail: impl std::fmt::Display) -> actix_web::Error {
    log::debug!("Rejected {}: {}", field, detail);
    AppError::Validation(vec![FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }])
    .into()
}

/// Registers services, extractor configuration and every route.
pub fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.auth.clone())
        .app_data(state.tasks.clone())
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| malformed("body", "\"body\" must be valid JSON", err)),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| malformed("query", "\"query\" is invalid", err)),
        )
        .app_data(
            web::PathConfig::default()
                .error_handler(|err, _req| malformed("id", "\"id\" is invalid", err)),
        )
        .service(health::index)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware::new(state.tokens.clone()))
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
