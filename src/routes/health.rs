use actix_web::{get, http::StatusCode, Responder};

use crate::response;

/// Liveness check.
#[get("/")]
pub async fn index() -> impl Responder {
    response::success::<()>(StatusCode::OK, "API is running...", None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    #[actix_web::test]
    async fn test_index_endpoint() {
        let app = test::init_service(actix_web::App::new().service(index)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "API is running...");
        assert!(json["data"].is_null());
    }
}
