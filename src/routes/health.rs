use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe for the Taskpad API.
///
/// Unauthenticated and mounted outside the `/api` scope so load balancers
/// can hit it without a token. Reports the service name and the server clock.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "taskpad",
        "timestamp": Utc::now(),
    }))
}
