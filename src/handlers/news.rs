use actix_web::{web, HttpResponse};

use super::parse_ticker;
use crate::error::ApiError;
use crate::models::{ApiResponse, NewsQuery};
use crate::services::news_service::NewsService;

/// 新闻列表，`q` 为关键词或逗号分隔的 ticker
pub async fn get_news(
    query: web::Query<NewsQuery>,
    news: web::Data<NewsService>,
) -> Result<HttpResponse, ApiError> {
    let items = news.get_news(query.q.as_deref()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

/// 单个 ticker 的新闻，不合并 RSS
pub async fn get_ticker_news(
    path: web::Path<String>,
    news: web::Data<NewsService>,
) -> Result<HttpResponse, ApiError> {
    let ticker = parse_ticker(&path)?;
    let items = news.get_ticker_news(&ticker).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/news")
            .route("", web::get().to(get_news))
            .route("/{ticker}", web::get().to(get_ticker_news)),
    );
}
