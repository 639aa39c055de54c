//! 管理接口，需要 Bearer API Key

use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::error::ApiError;
use crate::middleware::ApiKeyMiddleware;
use crate::models::ApiResponse;
use crate::services::admin_service;
use crate::services::store::ProfileStore;

pub async fn populate(store: web::Data<dyn ProfileStore>) -> Result<HttpResponse, ApiError> {
    let result = admin_service::populate_bots(store.get_ref(), Utc::now()).await?;
    let message = format!("Generated {} test users", result.count);
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(result, message)))
}

pub async fn purge(store: web::Data<dyn ProfileStore>) -> Result<HttpResponse, ApiError> {
    let result = admin_service::purge_bots(store.get_ref()).await?;
    let message = format!("Removed {} test users", result.count);
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(result, message)))
}

pub async fn delete_user(
    path: web::Path<String>,
    store: web::Data<dyn ProfileStore>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::bad_request("User ID required"));
    }

    let result = admin_service::delete_user(store.get_ref(), id).await?;
    if result.count == 0 {
        return Err(ApiError::NotFound(format!("User {} not found", id)));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(result, "User deleted")))
}

pub fn config(api_key: &str) -> impl FnOnce(&mut web::ServiceConfig) + '_ {
    move |cfg| {
        cfg.service(
            web::scope("/admin")
                .wrap(ApiKeyMiddleware::new(api_key))
                .route("/populate", web::post().to(populate))
                .route("/populate", web::delete().to(purge))
                .route("/users/{id}", web::delete().to(delete_user)),
        );
    }
}
