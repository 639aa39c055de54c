use actix_web::{web, HttpResponse};

use super::parse_ticker;
use crate::error::ApiError;
use crate::models::{ApiResponse, HistoryQuery, HistoryRange};
use crate::services::quote_service::QuoteService;

/// 单只 ticker 报价，上游失败时返回兜底值而不是错误
pub async fn get_quote(
    path: web::Path<String>,
    quotes: web::Data<QuoteService>,
) -> Result<HttpResponse, ApiError> {
    let ticker = parse_ticker(&path)?;
    let quote = quotes.quote_or_default(&ticker).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(quote)))
}

pub async fn get_history(
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
    quotes: web::Data<QuoteService>,
) -> Result<HttpResponse, ApiError> {
    let ticker = parse_ticker(&path)?;
    let range = HistoryRange::parse(query.range.as_deref());
    let history = quotes.get_history(&ticker, range).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(history)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/quote/{ticker}", web::get().to(get_quote))
        .route("/history/{ticker}", web::get().to(get_history));
}
