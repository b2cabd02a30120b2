#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Domain models, validation rules, authentication, persistence ports, services,"]
#![doc = "routing and error handling for the Taskboard API. The binary (`main.rs`) only"]
#![doc = "reads configuration, connects the pool and starts the server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

pub use crate::error::AppError;
pub use crate::state::AppState;
