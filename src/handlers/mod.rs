pub mod admin;
pub mod companies;
pub mod health;
pub mod market;
pub mod news;
pub mod portfolio;
pub mod quote;

use actix_web::web;

use crate::error::ApiError;
use crate::models::normalize_ticker;

/// 校验路径或请求体中的 ticker
pub(crate) fn parse_ticker(raw: &str) -> Result<String, ApiError> {
    normalize_ticker(raw).ok_or_else(|| ApiError::bad_request(format!("Invalid ticker: {}", raw.trim())))
}

pub fn config(cfg: &mut web::ServiceConfig, admin_key: &str) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                ApiError::bad_request(err.to_string()).into()
            }))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                ApiError::bad_request(err.to_string()).into()
            }))
            .configure(health::config)
            .configure(quote::config)
            .configure(news::config)
            .configure(market::config)
            .configure(portfolio::config)
            .configure(companies::config)
            .configure(admin::config(admin_key)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{CacheConfig, NewsConfig};
    use crate::models::{HistoryPoint, Profile, SEED_COMPANIES};
    use crate::services::news_service::NewsService;
    use crate::services::poller::QuotePoller;
    use crate::services::quote_service::QuoteService;
    use crate::services::rss::RssAggregator;
    use crate::services::store::{MemoryStore, ProfileStore};
    use crate::services::testing::{news_item, quote, FakeFeedSource, FakeNewsProvider, FakeQuoteProvider};
    use actix_web::{http::StatusCode, test as actix_test, App};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;

    const KEY: &str = "admin-secret";

    struct Fixture {
        quotes: Arc<FakeQuoteProvider>,
        news: Arc<FakeNewsProvider>,
        store: Arc<MemoryStore>,
        poller: Arc<QuotePoller>,
        quote_service: Arc<QuoteService>,
        news_service: Arc<NewsService>,
    }

    fn fixture() -> Fixture {
        // 新闻时间要落在保留期内，手动时钟使用当前时间
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let quotes = Arc::new(FakeQuoteProvider::default());
        let news = Arc::new(FakeNewsProvider::default());
        let quote_service = Arc::new(QuoteService::new(
            quotes.clone(),
            clock.clone(),
            &CacheConfig::default(),
        ));
        let rss = RssAggregator::new(
            Arc::new(FakeFeedSource::default()),
            Vec::new(),
            std::time::Duration::from_millis(50),
        )
        .unwrap();
        let news_service = Arc::new(NewsService::new(
            news.clone(),
            rss,
            clock.clone(),
            std::time::Duration::from_secs(300),
            NewsConfig::default(),
        ));
        let poller = Arc::new(QuotePoller::new(
            quote_service.clone(),
            vec!["MSFT".into(), "SONY".into(), "EA".into()],
            clock,
        ));
        Fixture {
            quotes,
            news,
            store: Arc::new(MemoryStore::new()),
            poller,
            quote_service,
            news_service,
        }
    }

    macro_rules! app {
        ($f:expr) => {{
            let store: Arc<dyn ProfileStore> = $f.store.clone();
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::from($f.quote_service.clone()))
                    .app_data(web::Data::from($f.news_service.clone()))
                    .app_data(web::Data::from($f.poller.clone()))
                    .app_data(web::Data::from(store))
                    .configure(|cfg| config(cfg, KEY)),
            )
            .await
        }};
    }

    macro_rules! call {
        ($app:expr, $req:expr $(,)?) => {{
            let resp = actix_test::call_service(&$app, $req.to_request()).await;
            let status = resp.status();
            let body: Value = actix_test::read_body_json(resp).await;
            (status, body)
        }};
    }

    #[actix_web::test]
    async fn test_health() {
        let f = fixture();
        let app = app!(f);
        let (status, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/health"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["timestamp"].as_str().is_some());
        assert_eq!(body["data"]["status"], "ok");
    }

    #[actix_web::test]
    async fn test_quote_endpoint() {
        let f = fixture();
        f.quotes.set_quote("EA", quote(140.0, 1.0));
        let app = app!(f);

        let (status, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/quote/ea"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["price"], 140.0);
        assert_eq!(body["data"]["changePercent"], 1.0);

        // 上游失败返回零值报价
        let (status, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/quote/NOPE"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["price"], 0.0);

        let (status, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/quote/BAD$"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_history_endpoint() {
        let f = fixture();
        f.quotes.set_history(
            "SONY",
            vec![HistoryPoint {
                date: "2024-04-30T00:00:00+00:00".into(),
                close: 85.0,
                volume: 1000,
            }],
        );
        let app = app!(f);

        let (status, body) =
            call!(app, actix_test::TestRequest::get().uri("/api/v1/history/SONY?range=1M"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["close"], 85.0);

        let (_, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/history/EA"));
        assert_eq!(body["data"], json!([]));
    }

    #[actix_web::test]
    async fn test_news_endpoints() {
        let f = fixture();
        let now = Utc::now();
        f.news.set(
            "gaming",
            vec![news_item("old", now - Duration::hours(3)), news_item("new", now - Duration::hours(1))],
        );
        f.news.set("TTWO", vec![news_item("tt", now)]);
        f.news.set("GAMING", vec![news_item("ticker", now)]);
        let app = app!(f);

        let (status, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/news"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], "new");
        assert_eq!(body["data"][1]["id"], "old");

        let (_, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/news/ttwo"));
        assert_eq!(body["data"][0]["id"], "tt");
        assert_eq!(body["data"][0]["sentiment"], "neutral");

        // 路径参数总是按 ticker 查询，不落到通用主题
        let (_, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/news/gaming"));
        assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["data"][0]["id"], "ticker");

        // 上游全部失败时返回空列表
        let (status, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/news?q=unknown"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
    }

    #[actix_web::test]
    async fn test_market_endpoints() {
        let f = fixture();
        f.quotes.set_quote("MSFT", quote(400.0, 1.2));
        f.quotes.set_quote("SONY", quote(85.0, 0.4));
        f.quotes.set_quote("EA", quote(140.0, -3.0));
        f.poller.refresh().await;
        let app = app!(f);

        let (_, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/market/quotes"));
        assert_eq!(body["data"]["loading"], false);
        assert_eq!(body["data"]["quotes"]["MSFT"]["price"], 400.0);
        assert_eq!(body["data"]["error"], Value::Null);

        let (_, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/market/briefing"));
        assert_eq!(body["data"]["status"], "bullish");

        let (_, body) =
            call!(app, actix_test::TestRequest::get().uri("/api/v1/market/movers?limit=1"));
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["ticker"], "EA");
    }

    #[actix_web::test]
    async fn test_portfolio_summary() {
        let f = fixture();
        f.quotes.set_quote("EA", quote(110.0, 0.0));
        let app = app!(f);

        let with_prices = json!({
            "positions": [{"ticker": "ttwo", "shares": 10.0, "averageCost": 100.0}],
            "prices": {"TTWO": 110.0}
        });
        let (status, body) = call!(
            app,
            actix_test::TestRequest::post().uri("/api/v1/portfolio/summary").set_json(&with_prices),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalInvested"], 1000.0);
        assert_eq!(body["data"]["currentValue"], 1100.0);
        assert_eq!(body["data"]["totalGain"], 100.0);
        assert!((body["data"]["roiPercent"].as_f64().unwrap() - 10.0).abs() < 1e-9);

        // 未提供价格时查询报价，失败的按成本估值
        let without_prices = json!({
            "positions": [
                {"ticker": "EA", "shares": 10.0, "averageCost": 100.0},
                {"ticker": "NOPE", "shares": 1.0, "averageCost": 50.0}
            ]
        });
        let (_, body) = call!(
            app,
            actix_test::TestRequest::post().uri("/api/v1/portfolio/summary").set_json(&without_prices),
        );
        assert_eq!(body["data"]["currentValue"], 1150.0);
        assert_eq!(body["data"]["positions"][1]["price"], 50.0);
    }

    #[actix_web::test]
    async fn test_portfolio_rejects_bad_input() {
        let f = fixture();
        let app = app!(f);

        let bad_ticker = json!({"positions": [{"ticker": "A B", "shares": 1.0, "averageCost": 1.0}]});
        let (status, body) = call!(
            app,
            actix_test::TestRequest::post().uri("/api/v1/portfolio/summary").set_json(&bad_ticker),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let negative = json!({"positions": [{"ticker": "EA", "shares": -1.0, "averageCost": 1.0}]});
        let (status, _) = call!(
            app,
            actix_test::TestRequest::post().uri("/api/v1/portfolio/summary").set_json(&negative),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call!(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/portfolio/summary")
                .insert_header(("content-type", "application/json"))
                .set_payload("{not json"),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_leaderboard() {
        let f = fixture();
        let profile = |id: &str, equity: f64| Profile {
            id: id.to_string(),
            username: id.to_string(),
            avatar_url: None,
            total_equity: equity,
            balance: 0.0,
            ranking_points: 0,
            weekly_start_equity: None,
            monthly_start_equity: None,
            updated_at: None,
        };
        f.store
            .insert_profiles(vec![profile("low", 9_000.0), profile("high", 12_000.0)])
            .await
            .unwrap();
        let app = app!(f);

        let (status, body) =
            call!(app, actix_test::TestRequest::get().uri("/api/v1/leaderboard?timeframe=weekly"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], "high");
        assert_eq!(body["data"][0]["rank"], 1);
        assert!((body["data"][0]["roiPercent"].as_f64().unwrap() - 20.0).abs() < 1e-9);

        let (status, body) =
            call!(app, actix_test::TestRequest::get().uri("/api/v1/leaderboard?timeframe=daily"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_companies() {
        let f = fixture();
        let app = app!(f);
        let (_, body) = call!(app, actix_test::TestRequest::get().uri("/api/v1/companies"));
        assert_eq!(body["data"].as_array().unwrap().len(), SEED_COMPANIES.len());
        assert_eq!(body["data"][0]["ticker"], SEED_COMPANIES[0].ticker);
    }

    #[actix_web::test]
    async fn test_admin_requires_bearer_key() {
        let f = fixture();
        let app = app!(f);

        let (status, body) = call!(app, actix_test::TestRequest::post().uri("/api/v1/admin/populate"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = call!(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/populate")
                .insert_header(("Authorization", "Bearer wrong")),
        );
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(f.store.list_profiles(100).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_admin_populate_and_purge() {
        let f = fixture();
        let app = app!(f);
        let auth = ("Authorization", format!("Bearer {}", KEY));

        let (status, body) = call!(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/populate")
                .insert_header(auth.clone()),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 10);
        assert_eq!(body["data"]["users"].as_array().unwrap().len(), 10);

        let first_id = body["data"]["users"][0]["id"].as_str().unwrap().to_string();
        let (status, _) = call!(
            app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/admin/users/{}", first_id))
                .insert_header(auth.clone()),
        );
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call!(
            app,
            actix_test::TestRequest::delete()
                .uri("/api/v1/admin/users/missing")
                .insert_header(auth.clone()),
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (_, body) = call!(
            app,
            actix_test::TestRequest::delete()
                .uri("/api/v1/admin/populate")
                .insert_header(auth),
        );
        assert_eq!(body["data"]["count"], 9);
        assert!(f.store.list_profiles(100).await.unwrap().is_empty());
    }

    #[test]
    fn test_parse_ticker() {
        assert_eq!(parse_ticker(" ntdoy ").unwrap(), "NTDOY");
        assert!(parse_ticker("").is_err());
        assert!(parse_ticker("DROP TABLE").is_err());
    }
}
