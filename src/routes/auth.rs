use actix_web::{http::StatusCode, post, web, HttpResponse};
use serde_json::Value;

use crate::{
    auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::AppError,
    response,
    services::AuthService,
    validation,
};

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: the user, without password.
/// - `400 Bad Request`: one entry per invalid field.
/// - `409 Conflict`: the email is already registered.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let registration =
        validation::from_json_body::<RegisterRequest>(body.into_inner())?.into_registration()?;
    let user = auth.register(registration).await?;

    Ok(response::success(
        StatusCode::CREATED,
        "User registered successfully",
        Some(user),
    ))
}

/// Login user
///
/// ## Responses:
/// - `200 OK`: `{ token }`, valid for one hour by default.
/// - `400 Bad Request`: one entry per invalid field.
/// - `401 Unauthorized`: unknown email or wrong password.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let (email, password) =
        validation::from_json_body::<LoginRequest>(body.into_inner())?.into_credentials()?;
    let token = auth.login(&email, &password).await?;

    Ok(response::success(
        StatusCode::OK,
        "Login successful",
        Some(LoginResponse { token }),
    ))
}
