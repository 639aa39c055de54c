//! 外部数据源接口
//!
//! 行情、新闻搜索和 RSS 抓取都通过这些 trait 访问，
//! 服务层只依赖 trait，测试中替换为内存实现

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{HistoryInterval, HistoryPoint, NewsItem, Quote};

/// 行情数据源
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// 获取单个 ticker 的最新报价
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote>;

    /// 获取 `from` 至今的历史走势，已过滤掉没有收盘价的点
    async fn fetch_history(
        &self,
        ticker: &str,
        from: DateTime<Utc>,
        interval: HistoryInterval,
    ) -> Result<Vec<HistoryPoint>>;
}

/// 新闻搜索数据源
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// 按关键词搜索新闻，最多返回 `count` 条
    async fn search_news(&self, query: &str, count: usize) -> Result<Vec<NewsItem>>;
}

/// RSS 抓取
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// 获取订阅地址的原始 XML 文本
    async fn fetch_feed(&self, url: &str) -> Result<String>;
}
