//! 报价与历史走势服务
//!
//! 在数据源之上加一层 TTL 缓存，并集中定义上游失败时的兜底策略

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::models::{HistoryPoint, HistoryRange, Quote};
use crate::services::provider::QuoteProvider;

/// 报价服务
///
/// 进程内构造一次，通过 `web::Data` 共享
pub struct QuoteService {
    provider: Arc<dyn QuoteProvider>,
    quotes: TtlCache<Quote>,
    history: TtlCache<Vec<HistoryPoint>>,
    clock: Arc<dyn Clock>,
}

impl QuoteService {
    pub fn new(provider: Arc<dyn QuoteProvider>, clock: Arc<dyn Clock>, cache: &CacheConfig) -> Self {
        Self {
            provider,
            quotes: TtlCache::new(cache.quote_ttl(), clock.clone()),
            history: TtlCache::new(cache.history_ttl(), clock.clone()),
            clock,
        }
    }

    fn quote_key(ticker: &str) -> String {
        format!("quote:{}", ticker)
    }

    /// 获取报价，缓存未命中时请求数据源，失败直接返回错误
    pub async fn get_quote(&self, ticker: &str) -> Result<Quote> {
        let key = Self::quote_key(ticker);
        self.quotes
            .get_or_try_insert_with(&key, || self.provider.fetch_quote(ticker))
            .await
    }

    /// 获取报价，永不失败
    ///
    /// 兜底顺序：有效缓存 → 数据源 → 最后一次成功的报价（已过期）→ 零值报价
    pub async fn quote_or_default(&self, ticker: &str) -> Quote {
        match self.get_quote(ticker).await {
            Ok(quote) => quote,
            Err(e) => {
                log::warn!("获取 {} 报价失败，使用兜底值: {:#}", ticker, e);
                self.quotes
                    .get_stale(&Self::quote_key(ticker))
                    .unwrap_or_else(|| Quote::zero(self.clock.now()))
            }
        }
    }

    /// 并发获取多只 ticker 的价格，失败的 ticker 不出现在结果中
    pub async fn current_prices(&self, tickers: &[String]) -> HashMap<String, f64> {
        let results = join_all(tickers.iter().map(|t| async move {
            (t.clone(), self.get_quote(t).await)
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(ticker, res)| match res {
                Ok(quote) => Some((ticker, quote.price)),
                Err(e) => {
                    log::warn!("获取 {} 价格失败: {:#}", ticker, e);
                    None
                }
            })
            .collect()
    }

    /// 获取历史走势
    ///
    /// 1D 只保留最后一个交易日的数据；失败时返回过期缓存或空列表
    pub async fn get_history(&self, ticker: &str, range: HistoryRange) -> Vec<HistoryPoint> {
        let now = self.clock.now();
        let (from, interval) = range.window(now);
        let key = format!("history:{}:{}:{}", ticker, range.as_str(), interval.as_str());

        let fetched = self
            .history
            .get_or_try_insert_with(&key, || async {
                log::info!("请求 {} 历史走势: {} 起, 粒度 {}", ticker, from, interval.as_str());
                self.provider.fetch_history(ticker, from, interval).await
            })
            .await;

        let points = match fetched {
            Ok(points) => points,
            Err(e) => {
                log::warn!("获取 {} 历史走势失败: {:#}", ticker, e);
                self.history.get_stale(&key).unwrap_or_default()
            }
        };

        if range == HistoryRange::OneDay {
            last_session(points)
        } else {
            points
        }
    }
}

/// 只保留与最后一个点同一天（UTC）的数据
fn last_session(points: Vec<HistoryPoint>) -> Vec<HistoryPoint> {
    let parse = |p: &HistoryPoint| {
        DateTime::parse_from_rfc3339(&p.date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    };
    let Some(last_day) = points.last().and_then(parse).map(|d| d.date_naive()) else {
        return points;
    };

    points
        .into_iter()
        .filter(|p| parse(p).is_some_and(|d| d.date_naive() >= last_day))
        .collect()
}
