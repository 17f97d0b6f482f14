use actix_web::{HttpResponse, Responder, get};
use serde_json::json;

macros_utils::routes! {
    route welcome_route,
}

/// Unauthenticated liveness route
#[get("/")]
pub async fn welcome_route() -> impl Responder {
    HttpResponse::Ok().json(json!({ "msg": "Welcome to the Sentinel API" }))
}
