//! GamePulse 后端服务
//!
//! 提供游戏行业股票行情、新闻聚合、模拟组合收益和排行榜的 RESTful API
//! 数据来源：Yahoo Finance、GamesIndustry.biz / Game Developer RSS、Supabase

mod cache;      // TTL 缓存
mod clock;      // 时钟抽象
mod config;     // 配置加载
mod error;      // HTTP 错误类型
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::services::market::YahooProvider;
use crate::services::news_service::NewsService;
use crate::services::poller::QuotePoller;
use crate::services::quote_service::QuoteService;
use crate::services::rss::{HttpFeedSource, RssAggregator};
use crate::services::store::{MemoryStore, ProfileStore, SupabaseStore};

fn io_error(e: anyhow::Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{:#}", e))
}

/// 应用程序入口
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    log::info!("启动 GamePulse 后端服务");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .connect_timeout(Duration::from_secs(config.api.connect_timeout_secs))
        .user_agent(config.api.user_agent.as_str())
        .gzip(true)
        .build()
        .map_err(|e| io_error(e.into()))?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let yahoo = Arc::new(YahooProvider::new(client.clone()));

    let quotes = Arc::new(QuoteService::new(yahoo.clone(), clock.clone(), &config.cache));

    let rss = RssAggregator::new(
        Arc::new(HttpFeedSource::new(client.clone())),
        config.news.feeds.clone(),
        Duration::from_secs(config.news.rss_timeout_secs),
    )
    .map_err(io_error)?;
    let news = Arc::new(NewsService::new(
        yahoo,
        rss,
        clock.clone(),
        config.cache.news_ttl(),
        config.news.clone(),
    ));

    let store: Arc<dyn ProfileStore> = if config.store.is_remote() {
        log::info!("使用 Supabase 存储: {}", config.store.supabase_url);
        Arc::new(
            SupabaseStore::new(client, &config.store.supabase_url, &config.store.service_key)
                .map_err(io_error)?,
        )
    } else {
        log::warn!("未配置 Supabase，使用内存存储");
        Arc::new(MemoryStore::new())
    };

    let poller = Arc::new(if config.poller.enabled {
        QuotePoller::start(
            quotes.clone(),
            config.poller.tickers.clone(),
            Duration::from_secs(config.poller.interval_secs),
            clock.clone(),
        )
    } else {
        log::info!("报价轮询已禁用");
        QuotePoller::new(quotes.clone(), config.poller.tickers.clone(), clock.clone())
    });

    let admin_key = config.admin.api_key.clone();
    if admin_key.is_empty() {
        log::warn!("未设置 ADMIN_API_KEY，管理接口不做认证");
    }

    let bind_addr = config.bind_addr();
    log::info!("监听 {}", bind_addr);

    // 创建并启动 HTTP 服务器
    let server = {
        let poller = poller.clone();
        let mut server = HttpServer::new(move || {
            App::new()
                .wrap(Logger::default()) // 添加请求日志中间件
                .app_data(web::Data::from(quotes.clone()))
                .app_data(web::Data::from(news.clone()))
                .app_data(web::Data::from(poller.clone()))
                .app_data(web::Data::from(store.clone()))
                .configure(|cfg| handlers::config(cfg, &admin_key)) // 配置路由
        });
        if config.server.workers > 0 {
            server = server.workers(config.server.workers);
        }
        server.bind(bind_addr)?.run()
    };

    let result = server.await;
    poller.stop();
    result
}
