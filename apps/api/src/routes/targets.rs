use actix_web::{HttpResponse, delete, get, post, web};
use sentinel::probe::validate_url;
use sentinel_store::Store;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;

macros_utils::routes! {
    route create_target,
    route target_status,
    route list_targets,
    route disable_target,
}

#[derive(Debug, Deserialize)]
pub struct CreateTargetBody {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetQuery {
    pub target_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableTargetBody {
    pub target_id: String,
}

/// Start monitoring a url for the caller
#[post("/api/v1/target")]
pub async fn create_target(
    user: AuthenticatedUser,
    store: web::Data<dyn Store>,
    body: web::Json<CreateTargetBody>,
) -> Result<HttpResponse, ApiError> {
    validate_url(&body.url).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let target = store.create_target(&user.user_id, &body.url).await?;
    info!("Target {} added for {} ({})", target.id, user.user_id, target.url);

    Ok(HttpResponse::Ok().json(json!({ "id": target.id })))
}

/// One of the caller's targets with its ticks, or `null`
#[get("/api/v1/target/status")]
pub async fn target_status(
    user: AuthenticatedUser,
    store: web::Data<dyn Store>,
    query: web::Query<TargetQuery>,
) -> Result<HttpResponse, ApiError> {
    let data = store.get_target_with_ticks(&user.user_id, &query.target_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": data })))
}

#[get("/api/v1/targets")]
pub async fn list_targets(
    user: AuthenticatedUser,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, ApiError> {
    let targets = store.list_targets_for_user(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "targets": targets })))
}

/// Soft delete; ticks are kept but the target is no longer probed
#[delete("/api/v1/target")]
pub async fn disable_target(
    user: AuthenticatedUser,
    store: web::Data<dyn Store>,
    body: web::Json<DisableTargetBody>,
) -> Result<HttpResponse, ApiError> {
    if !store.disable_target(&user.user_id, &body.target_id).await? {
        return Err(ApiError::NotFound);
    }

    info!("Target {} disabled by {}", body.target_id, user.user_id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Deleted target successfully" })))
}
