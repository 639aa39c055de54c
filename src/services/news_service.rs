//! 新闻聚合服务
//!
//! 合并搜索接口结果和 RSS 源，按发布时间倒序输出
//!
//! ## 规则
//! - 查询为空时使用通用主题（默认 `gaming`），通用主题额外合并 RSS
//! - 逗号分隔的查询视为 ticker 列表，最多并发查询前 N 个，按 id 去重保留首次出现
//! - 超过最大保留天数的条目在每次返回前过滤，包括缓存中的结果
//! - 排序为稳定排序，发布时间相同时保持合并顺序（搜索结果在前，RSS 按配置顺序）
//! - 任一数据源失败只记录日志，整体永不失败

use chrono::Duration;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::config::NewsConfig;
use crate::models::NewsItem;
use crate::services::provider::NewsProvider;
use crate::services::rss::RssAggregator;

/// 规范化后的查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsTarget {
    /// 通用主题，合并 RSS
    General(String),
    /// 任意关键词
    Keyword(String),
    /// ticker 列表
    Tickers(Vec<String>),
}

impl NewsTarget {
    fn cache_key(&self) -> String {
        match self {
            NewsTarget::General(q) | NewsTarget::Keyword(q) => format!("news:{}", q.to_lowercase()),
            NewsTarget::Tickers(t) => format!("news:tickers:{}", t.join(",")),
        }
    }
}

/// 新闻聚合服务
pub struct NewsService {
    provider: Arc<dyn NewsProvider>,
    rss: RssAggregator,
    cache: TtlCache<Vec<NewsItem>>,
    clock: Arc<dyn Clock>,
    settings: NewsConfig,
}

impl NewsService {
    pub fn new(
        provider: Arc<dyn NewsProvider>,
        rss: RssAggregator,
        clock: Arc<dyn Clock>,
        cache_ttl: std::time::Duration,
        settings: NewsConfig,
    ) -> Self {
        Self {
            provider,
            rss,
            cache: TtlCache::new(cache_ttl, clock.clone()),
            clock,
            settings,
        }
    }

    /// 解析查询字符串
    pub fn target(&self, query: Option<&str>) -> NewsTarget {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let Some(query) = query else {
            return NewsTarget::General(self.settings.default_query.clone());
        };

        if query.contains(',') {
            let mut tickers: Vec<String> = Vec::new();
            for t in query.split(',').map(|t| t.trim().to_uppercase()) {
                if !t.is_empty() && !tickers.contains(&t) {
                    tickers.push(t);
                }
            }
            tickers.truncate(self.settings.max_tickers);
            return NewsTarget::Tickers(tickers);
        }

        if query.eq_ignore_ascii_case(&self.settings.default_query) {
            NewsTarget::General(query.to_string())
        } else {
            NewsTarget::Keyword(query.to_string())
        }
    }

    /// 获取合并后的新闻列表，永不失败
    pub async fn get_news(&self, query: Option<&str>) -> Vec<NewsItem> {
        let target = self.target(query);
        self.fetch(target).await
    }

    /// 单个 ticker 的新闻，只查搜索接口，不合并 RSS
    pub async fn get_ticker_news(&self, ticker: &str) -> Vec<NewsItem> {
        self.fetch(NewsTarget::Tickers(vec![ticker.trim().to_uppercase()])).await
    }

    async fn fetch(&self, target: NewsTarget) -> Vec<NewsItem> {
        let key = target.cache_key();

        let items = match self.cache.get(&key) {
            Some(hit) => hit,
            None => {
                let (items, answered) = self.collect(&target).await;
                // 所有数据源都失败时不缓存，下一次请求重新尝试
                if answered {
                    self.cache.insert(key, items.clone());
                }
                items
            }
        };

        self.drop_stale(items)
    }

    /// 抓取并合并，返回结果以及是否至少有一个数据源成功
    async fn collect(&self, target: &NewsTarget) -> (Vec<NewsItem>, bool) {
        let count = self.settings.news_count;
        let mut answered = false;
        let mut merged = Vec::new();

        match target {
            NewsTarget::Tickers(tickers) => {
                let results =
                    join_all(tickers.iter().map(|t| self.provider.search_news(t, count))).await;
                for (ticker, res) in tickers.iter().zip(results) {
                    match res {
                        Ok(items) => {
                            answered = true;
                            merged.extend(items);
                        }
                        Err(e) => log::warn!("搜索 {} 新闻失败: {:#}", ticker, e),
                    }
                }
            }
            NewsTarget::General(query) => {
                let (search, rss) = futures::join!(
                    self.provider.search_news(query, count),
                    self.rss.fetch_all()
                );
                match search {
                    Ok(items) => {
                        answered = true;
                        merged.extend(items);
                    }
                    Err(e) => log::warn!("搜索新闻失败: {:#}", e),
                }
                if !rss.is_empty() {
                    answered = true;
                }
                merged.extend(rss);
            }
            NewsTarget::Keyword(query) => match self.provider.search_news(query, count).await {
                Ok(items) => {
                    answered = true;
                    merged.extend(items);
                }
                Err(e) => log::warn!("搜索 {} 新闻失败: {:#}", query, e),
            },
        }

        (merge_news(merged), answered)
    }

    fn drop_stale(&self, items: Vec<NewsItem>) -> Vec<NewsItem> {
        let cutoff = (self.clock.now() - Duration::days(self.settings.max_age_days)).timestamp_millis();
        items.into_iter().filter(|i| i.datetime >= cutoff).collect()
    }
}

/// 按 id 去重（保留首次出现）后按发布时间倒序稳定排序
pub fn merge_news(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    let mut unique: Vec<NewsItem> = items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();
    unique.sort_by(|a, b| b.datetime.cmp(&a.datetime));
    unique
}
