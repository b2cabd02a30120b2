//! Uniform `{success, message, data}` response envelope.

use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

/// Body shape shared by every endpoint, success or failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

/// Builds a successful response. `data` of `None` serializes as `null`.
pub fn success<T: Serialize>(
    status: StatusCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse {
        success: true,
        message: message.into(),
        data,
    })
}

pub fn failure(
    status: StatusCode,
    message: impl Into<String>,
    data: Option<serde_json::Value>,
) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse {
        success: false,
        message: message.into(),
        data,
    })
}
