use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

/// Health check endpoint
///
/// Unauthenticated liveness check reporting the store backend and server time.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "store": state.store.backend(),
        "timestamp": Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenService;
    use crate::store::MemoryStore;
    use actix_web::test;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_endpoint() {
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            TokenService::new(b"health-secret", chrono::Duration::minutes(30)),
            4,
        );
        let app = test::init_service(
            actix_web::App::new()
                .app_data(web::Data::new(state))
                .service(health),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["store"], "memory");
        assert!(json["timestamp"].is_string());
    }
}
