use actix_web::{web, HttpResponse};
use std::collections::HashMap;

use super::parse_ticker;
use crate::error::ApiError;
use crate::models::{ApiResponse, LeaderboardQuery, PortfolioRequest, Position};
use crate::services::portfolio_service::{calculate_portfolio, rank_leaderboard, LEADERBOARD_FETCH_LIMIT};
use crate::services::quote_service::QuoteService;
use crate::services::store::ProfileStore;

fn validate(positions: Vec<Position>) -> Result<Vec<Position>, ApiError> {
    positions
        .into_iter()
        .map(|p| {
            let ticker = parse_ticker(&p.ticker)?;
            if !p.shares.is_finite() || p.shares < 0.0 {
                return Err(ApiError::bad_request(format!("Invalid shares for {}", ticker)));
            }
            if !p.average_cost.is_finite() || p.average_cost < 0.0 {
                return Err(ApiError::bad_request(format!("Invalid averageCost for {}", ticker)));
            }
            Ok(Position { ticker, ..p })
        })
        .collect()
}

/// 组合估值，未提供价格时按持仓 ticker 查询当前价
pub async fn portfolio_summary(
    body: web::Json<PortfolioRequest>,
    quotes: web::Data<QuoteService>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let positions = validate(request.positions)?;

    let prices: HashMap<String, f64> = match request.prices {
        Some(prices) => prices
            .into_iter()
            .map(|(ticker, price)| (ticker.trim().to_uppercase(), price))
            .collect(),
        None => {
            let mut tickers: Vec<String> = positions.iter().map(|p| p.ticker.clone()).collect();
            tickers.sort();
            tickers.dedup();
            quotes.current_prices(&tickers).await
        }
    };

    let summary = calculate_portfolio(&positions, &prices);
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

pub async fn leaderboard(
    query: web::Query<LeaderboardQuery>,
    store: web::Data<dyn ProfileStore>,
) -> Result<HttpResponse, ApiError> {
    let profiles = store.list_profiles(LEADERBOARD_FETCH_LIMIT).await?;
    let ranked = rank_leaderboard(profiles, query.timeframe);
    Ok(HttpResponse::Ok().json(ApiResponse::success(ranked)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/portfolio/summary", web::post().to(portfolio_summary))
        .route("/leaderboard", web::get().to(leaderboard));
}
