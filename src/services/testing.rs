//! 测试用的内存数据源

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{HistoryInterval, HistoryPoint, NewsItem, Quote, Sentiment};
use crate::services::provider::{FeedSource, NewsProvider, QuoteProvider};

pub fn quote(price: f64, change_percent: f64) -> Quote {
    Quote {
        price,
        change: price * change_percent / 100.0,
        change_percent,
        last_updated: 1_714_560_000_000,
    }
}

pub fn news_item(id: &str, datetime: DateTime<Utc>) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        headline: format!("headline {}", id),
        summary: String::new(),
        source: "Yahoo".to_string(),
        url: format!("https://news.example.com/{}", id),
        image: None,
        datetime: datetime.timestamp_millis(),
        category: "General".to_string(),
        related_tickers: String::new(),
        sentiment: Sentiment::Neutral,
    }
}

/// 可编排结果的行情源，未设置的 ticker 返回错误
#[derive(Default)]
pub struct FakeQuoteProvider {
    quotes: Mutex<HashMap<String, Quote>>,
    history: Mutex<HashMap<String, Vec<HistoryPoint>>>,
    pub quote_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
}

impl FakeQuoteProvider {
    pub fn set_quote(&self, ticker: &str, quote: Quote) {
        self.quotes.lock().unwrap().insert(ticker.to_string(), quote);
    }

    pub fn fail_quote(&self, ticker: &str) {
        self.quotes.lock().unwrap().remove(ticker);
    }

    pub fn set_history(&self, ticker: &str, points: Vec<HistoryPoint>) {
        self.history.lock().unwrap().insert(ticker.to_string(), points);
    }

    pub fn fail_history(&self, ticker: &str) {
        self.history.lock().unwrap().remove(ticker);
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for FakeQuoteProvider {
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .lock()
            .unwrap()
            .get(ticker)
            .cloned()
            .ok_or_else(|| anyhow!("上游不可用: {}", ticker))
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        _from: DateTime<Utc>,
        _interval: HistoryInterval,
    ) -> Result<Vec<HistoryPoint>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history
            .lock()
            .unwrap()
            .get(ticker)
            .cloned()
            .ok_or_else(|| anyhow!("上游不可用: {}", ticker))
    }
}

/// 按查询词返回固定结果的新闻源，未设置的查询返回错误
#[derive(Default)]
pub struct FakeNewsProvider {
    results: Mutex<HashMap<String, Vec<NewsItem>>>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeNewsProvider {
    pub fn set(&self, query: &str, items: Vec<NewsItem>) {
        self.results.lock().unwrap().insert(query.to_string(), items);
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsProvider for FakeNewsProvider {
    async fn search_news(&self, query: &str, count: usize) -> Result<Vec<NewsItem>> {
        self.queries.lock().unwrap().push(query.to_string());
        let mut items = self
            .results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .ok_or_else(|| anyhow!("搜索失败: {}", query))?;
        items.truncate(count);
        Ok(items)
    }
}

/// RSS 源的行为
#[derive(Clone)]
pub enum FeedBehavior {
    Body(String),
    Fail,
    /// 延迟后返回内容，用于触发超时
    Slow(Duration, String),
}

#[derive(Default)]
pub struct FakeFeedSource {
    feeds: Mutex<HashMap<String, FeedBehavior>>,
}

impl FakeFeedSource {
    pub fn set(&self, url: &str, behavior: FeedBehavior) {
        self.feeds.lock().unwrap().insert(url.to_string(), behavior);
    }
}

#[async_trait]
impl FeedSource for FakeFeedSource {
    async fn fetch_feed(&self, url: &str) -> Result<String> {
        let behavior = self.feeds.lock().unwrap().get(url).cloned();
        match behavior {
            Some(FeedBehavior::Body(body)) => Ok(body),
            Some(FeedBehavior::Slow(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            Some(FeedBehavior::Fail) | None => Err(anyhow!("连接被拒绝: {}", url)),
        }
    }
}

/// 生成 RSS 2.0 文档，条目为 (guid, 标题, pubDate)
pub fn rss_document(items: &[(&str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(guid, title, date)| {
            format!(
                "<item><title>{}</title><link>https://feed.example.com/{}</link>\
                 <guid isPermaLink=\"false\">{}</guid><pubDate>{}</pubDate>\
                 <description>&lt;p&gt;Summary of {}&lt;/p&gt;</description></item>",
                title, guid, guid, date, title
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><rss version=\"2.0\"><channel><title>Feed</title>{}</channel></rss>",
        body
    )
}
