use actix_web::{web, HttpResponse, Result};

use crate::models::{ApiResponse, SEED_COMPANIES};

pub async fn list_companies() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(SEED_COMPANIES)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/companies", web::get().to(list_companies));
}
