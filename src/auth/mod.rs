pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::models::Role;
use crate::validation::{parse_field, required_field, validate_role, BodySchema, JsonKind};

pub use extractors::{
    AuthenticatedUser, Authorized, ManagerOnly, ManagerRequired, ManagersAndEmployees, RoleSet,
};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

/// Represents the payload for a new user registration request.
///
/// Fields are optional at the serde level so that a missing field is reported
/// alongside every other invalid one.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name. Must not be empty.
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    /// Email address for the new account. Must be unique.
    #[validate(required, email)]
    pub email: Option<String>,
    /// Password for the new account.
    /// Must be at least 8 characters long.
    #[validate(required, length(min = 8))]
    pub password: Option<String>,
    /// One of `ADMIN`, `MANAGER`, `EMPLOYEE`.
    #[validate(required, custom = "validate_role")]
    pub role: Option<String>,
}

impl BodySchema for RegisterRequest {
    const FIELDS: &'static [(&'static str, JsonKind)] = &[
        ("name", JsonKind::String),
        ("email", JsonKind::String),
        ("password", JsonKind::String),
        ("role", JsonKind::String),
    ];
}

/// A validated registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegisterRequest {
    pub fn into_registration(self) -> Result<Registration, AppError> {
        self.validate()?;

        Ok(Registration {
            name: required_field("name", self.name)?,
            email: required_field("email", self.email)?,
            password: required_field("password", self.password)?,
            role: parse_field("role", &required_field("role", self.role)?)?,
        })
    }
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

impl BodySchema for LoginRequest {
    const FIELDS: &'static [(&'static str, JsonKind)] =
        &[("email", JsonKind::String), ("password", JsonKind::String)];
}

impl LoginRequest {
    /// Validates the payload, returning `(email, password)`.
    pub fn into_credentials(self) -> Result<(String, String), AppError> {
        self.validate()?;
        Ok((
            required_field("email", self.email)?,
            required_field("password", self.password)?,
        ))
    }
}

/// Returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The JWT (JSON Web Token) for session authentication.
    pub token: String,
}
