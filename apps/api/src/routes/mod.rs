use actix_web::web::ServiceConfig;

pub mod health;
pub mod targets;

pub fn routes(cfg: &mut ServiceConfig) {
    health::routes(cfg);
    targets::routes(cfg);
}
