use actix_web::{web, HttpResponse, Result};

use crate::models::{ApiResponse, MoversQuery};
use crate::services::market_service::{market_briefing, top_movers, DEFAULT_MOVERS};
use crate::services::poller::QuotePoller;

pub async fn get_quotes(poller: web::Data<QuotePoller>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(poller.snapshot())))
}

pub async fn get_briefing(poller: web::Data<QuotePoller>) -> Result<HttpResponse> {
    let briefing = market_briefing(&poller.snapshot());
    Ok(HttpResponse::Ok().json(ApiResponse::success(briefing)))
}

pub async fn get_movers(
    query: web::Query<MoversQuery>,
    poller: web::Data<QuotePoller>,
) -> Result<HttpResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_MOVERS);
    let movers = top_movers(&poller.snapshot(), limit);
    Ok(HttpResponse::Ok().json(ApiResponse::success(movers)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/market")
            .route("/quotes", web::get().to(get_quotes))
            .route("/briefing", web::get().to(get_briefing))
            .route("/movers", web::get().to(get_movers)),
    );
}
