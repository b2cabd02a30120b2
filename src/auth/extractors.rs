use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::Role;

/// The identity `AuthMiddleware` attached to the request.
///
/// Fails with `AppError::Unauthorized` when no claims are present, i.e. when the
/// route is not behind `AuthMiddleware`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        }
    }
}

impl AuthenticatedUser {
    fn from_extensions(req: &HttpRequest) -> Result<Self, AppError> {
        req.extensions()
            .get::<Claims>()
            .cloned()
            .map(AuthenticatedUser::from)
            .ok_or_else(|| AppError::Unauthorized("Unauthorized: No token provided".to_string()))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(AuthenticatedUser::from_extensions(req).map_err(Into::into))
    }
}

/// A fixed set of roles a route accepts.
pub trait RoleSet {
    const ALLOWED: &'static [Role];

    fn permits(role: Role) -> bool {
        Self::ALLOWED.contains(&role)
    }

    fn denial_message() -> String {
        let names: Vec<&str> = Self::ALLOWED.iter().map(|r| r.as_str()).collect();
        format!("Access denied: Requires one of [{}] role", names.join(", "))
    }
}

/// Routes only managers may use.
#[derive(Debug)]
pub struct ManagerOnly;

impl RoleSet for ManagerOnly {
    const ALLOWED: &'static [Role] = &[Role::Manager];
}

/// Manager-only routes that name the role directly: `Requires MANAGER role`.
#[derive(Debug)]
pub struct ManagerRequired;

impl RoleSet for ManagerRequired {
    const ALLOWED: &'static [Role] = &[Role::Manager];

    fn denial_message() -> String {
        "Access denied: Requires MANAGER role".to_string()
    }
}

/// Routes open to both managers and employees.
#[derive(Debug)]
pub struct ManagersAndEmployees;

impl RoleSet for ManagersAndEmployees {
    const ALLOWED: &'static [Role] = &[Role::Manager, Role::Employee];
}

/// An authenticated user whose role is in `R`, otherwise `403 Forbidden`.
///
/// Declare it as the first handler argument so the role check happens before
/// the body is read and validated.
#[derive(Debug)]
pub struct Authorized<R: RoleSet> {
    pub user: AuthenticatedUser,
    _roles: PhantomData<R>,
}

impl<R: RoleSet> Authorized<R> {
    pub fn into_inner(self) -> AuthenticatedUser {
        self.user
    }
}

impl<R: RoleSet> FromRequest for Authorized<R> {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = AuthenticatedUser::from_extensions(req).and_then(|user| {
            if R::permits(user.role) {
                Ok(Authorized {
                    user,
                    _roles: PhantomData,
                })
            } else {
                log::warn!("{} ({}) denied access to {}", user.email, user.role, req.path());
                Err(AppError::Forbidden(R::denial_message()))
            }
        });
        ready(result.map_err(Into::into))
    }
}
