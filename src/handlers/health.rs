use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::models::ApiResponse;

pub async fn health_check() -> Result<HttpResponse> {
    let status = json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    });
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(status, "Service is healthy")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
