//! Yahoo Finance 接口实现
//!
//! 提供实时报价、历史走势和新闻搜索
//! 对接 https://query1.finance.yahoo.com 的 chart / search 接口

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::common::{
    epoch_to_millis, parse_time_value, DEFAULT_NEWS_CATEGORY, YAHOO_CHART_API, YAHOO_SEARCH_API,
};
use crate::models::{HistoryInterval, HistoryPoint, NewsItem, Quote, Sentiment};
use crate::services::provider::{NewsProvider, QuoteProvider};

/// Yahoo Finance 数据源
///
/// 共享一个 HTTP 客户端，超时和 User-Agent 在构造客户端时设置
pub struct YahooProvider {
    client: Client,
}

impl YahooProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 拼接图表接口地址，ticker 作为路径段编码
    fn chart_url(ticker: &str) -> Result<Url> {
        let mut url = Url::parse(YAHOO_CHART_API)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("无效的图表接口地址"))?
            .push(ticker);
        Ok(url)
    }

    async fn get_json(&self, url: Url, query: &[(&str, String)]) -> Result<Value> {
        log::debug!("请求 Yahoo 接口: {}", url);
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Yahoo 接口返回错误状态: {}", response.status()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote> {
        let url = Self::chart_url(ticker)?;
        let json = self
            .get_json(url, &[("range", "1d".to_string()), ("interval", "1d".to_string())])
            .await?;
        parse_chart_quote(&json, ticker, Utc::now())
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        from: DateTime<Utc>,
        interval: HistoryInterval,
    ) -> Result<Vec<HistoryPoint>> {
        let url = Self::chart_url(ticker)?;
        let json = self
            .get_json(
                url,
                &[
                    ("period1", from.timestamp().to_string()),
                    ("period2", Utc::now().timestamp().to_string()),
                    ("interval", interval.as_str().to_string()),
                ],
            )
            .await?;
        parse_chart_history(&json, ticker)
    }
}

#[async_trait]
impl NewsProvider for YahooProvider {
    async fn search_news(&self, query: &str, count: usize) -> Result<Vec<NewsItem>> {
        let url = Url::parse(YAHOO_SEARCH_API)?;
        let json = self
            .get_json(
                url,
                &[
                    ("q", query.to_string()),
                    ("newsCount", count.to_string()),
                    ("quotesCount", "0".to_string()),
                ],
            )
            .await?;
        let mut items = parse_search_news(&json, Utc::now());
        items.truncate(count);
        Ok(items)
    }
}

/// 取出 chart.result[0]，上游报错或无结果时返回错误
fn chart_result<'a>(json: &'a Value, ticker: &str) -> Result<&'a Value> {
    let chart = &json["chart"];
    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let description = err["description"].as_str().unwrap_or("未知错误");
        return Err(anyhow!("{} 行情获取失败: {}", ticker, description));
    }

    let result = &chart["result"][0];
    if result.is_null() {
        return Err(anyhow!("{} 无行情数据", ticker));
    }
    Ok(result)
}

/// 解析图表接口中的报价
///
/// 涨跌额按前收盘价计算，缺少前收盘价时涨跌为 0
pub(crate) fn parse_chart_quote(json: &Value, ticker: &str, now: DateTime<Utc>) -> Result<Quote> {
    let meta = &chart_result(json, ticker)?["meta"];

    let price = meta["regularMarketPrice"]
        .as_f64()
        .ok_or_else(|| anyhow!("{} 缺少 regularMarketPrice", ticker))?;
    let prev_close = meta["chartPreviousClose"]
        .as_f64()
        .or_else(|| meta["previousClose"].as_f64())
        .unwrap_or(0.0);

    let change = if prev_close > 0.0 { price - prev_close } else { 0.0 };
    let change_percent = if prev_close > 0.0 { (change / prev_close) * 100.0 } else { 0.0 };
    let last_updated = meta["regularMarketTime"]
        .as_i64()
        .map(epoch_to_millis)
        .unwrap_or_else(|| now.timestamp_millis());

    Ok(Quote {
        price,
        change,
        change_percent,
        last_updated,
    })
}

/// 解析图表接口中的历史走势，跳过收盘价为 null 的点
pub(crate) fn parse_chart_history(json: &Value, ticker: &str) -> Result<Vec<HistoryPoint>> {
    let result = chart_result(json, ticker)?;

    let Some(timestamps) = result["timestamp"].as_array() else {
        // 区间内没有交易
        return Ok(Vec::new());
    };
    let quote = &result["indicators"]["quote"][0];
    let closes = quote["close"].as_array();
    let volumes = quote["volume"].as_array();

    let mut history = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(date) = ts.as_i64().and_then(|s| DateTime::from_timestamp(s, 0)) else {
            continue;
        };
        let Some(close) = closes.and_then(|c| c.get(i)).and_then(Value::as_f64) else {
            continue;
        };
        let volume = volumes
            .and_then(|v| v.get(i))
            .and_then(Value::as_u64)
            .unwrap_or(0);

        history.push(HistoryPoint {
            date: date.to_rfc3339(),
            close,
            volume,
        });
    }

    Ok(history)
}

/// 解析搜索接口中的新闻列表
///
/// 没有标题的条目直接丢弃；缺少发布时间时使用抓取时间
pub(crate) fn parse_search_news(json: &Value, now: DateTime<Utc>) -> Vec<NewsItem> {
    let Some(news) = json["news"].as_array() else {
        return Vec::new();
    };

    news.iter()
        .filter_map(|item| {
            let headline = item["title"].as_str().map(str::trim).filter(|t| !t.is_empty())?;
            let url = item["link"].as_str().unwrap_or("").to_string();
            let id = item["uuid"]
                .as_str()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .or_else(|| Some(url.clone()).filter(|u| !u.is_empty()))
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let datetime = parse_time_value(&item["providerPublishTime"]).unwrap_or(now);
            let image = item["thumbnail"]["resolutions"][0]["url"]
                .as_str()
                .map(str::to_string);
            let related_tickers = item["relatedTickers"]
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(",")
                })
                .unwrap_or_default();

            Some(NewsItem {
                id,
                headline: headline.to_string(),
                summary: String::new(),
                source: item["publisher"].as_str().unwrap_or("Yahoo Finance").to_string(),
                url,
                image,
                datetime: datetime.timestamp_millis(),
                category: DEFAULT_NEWS_CATEGORY.to_string(),
                related_tickers,
                sentiment: Sentiment::of_headline(headline),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_chart_url_encodes_ticker() {
        let url = YahooProvider::chart_url("UBI.PA").unwrap();
        assert_eq!(url.as_str(), "https://query1.finance.yahoo.com/v8/finance/chart/UBI.PA");

        let url = YahooProvider::chart_url("A/B").unwrap();
        assert_eq!(url.as_str(), "https://query1.finance.yahoo.com/v8/finance/chart/A%2FB");
    }

    #[test]
    fn test_parse_chart_quote() {
        let json = json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "EA",
                        "regularMarketPrice": 110.0,
                        "chartPreviousClose": 100.0,
                        "regularMarketTime": 1_714_560_000
                    }
                }],
                "error": null
            }
        });

        let quote = parse_chart_quote(&json, "EA", now()).unwrap();
        assert_eq!(quote.price, 110.0);
        assert!((quote.change - 10.0).abs() < 1e-9);
        assert!((quote.change_percent - 10.0).abs() < 1e-9);
        assert_eq!(quote.last_updated, 1_714_560_000_000);
    }

    #[test]
    fn test_parse_chart_quote_without_previous_close() {
        let json = json!({
            "chart": { "result": [{ "meta": { "regularMarketPrice": 42.5 } }], "error": null }
        });

        let quote = parse_chart_quote(&json, "NEW", now()).unwrap();
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_percent, 0.0);
        assert_eq!(quote.last_updated, now().timestamp_millis());
    }

    #[test]
    fn test_parse_chart_error() {
        let json = json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        });

        let err = parse_chart_quote(&json, "ZZZZ", now()).unwrap_err();
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn test_parse_chart_quote_missing_price() {
        let json = json!({ "chart": { "result": [{ "meta": {} }], "error": null } });
        assert!(parse_chart_quote(&json, "EA", now()).is_err());
    }

    #[test]
    fn test_parse_chart_history_skips_null_close() {
        let json = json!({
            "chart": {
                "result": [{
                    "meta": {},
                    "timestamp": [1_714_560_000, 1_714_646_400, 1_714_732_800],
                    "indicators": {
                        "quote": [{
                            "close": [100.5, null, 102.25],
                            "volume": [1000, 0, null]
                        }]
                    }
                }],
                "error": null
            }
        });

        let history = parse_chart_history(&json, "EA").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].close, 100.5);
        assert_eq!(history[0].volume, 1000);
        assert_eq!(history[0].date, "2024-05-01T10:40:00+00:00");
        assert_eq!(history[1].close, 102.25);
        assert_eq!(history[1].volume, 0);
    }

    #[test]
    fn test_parse_chart_history_without_timestamps() {
        let json = json!({ "chart": { "result": [{ "meta": {} }], "error": null } });
        assert!(parse_chart_history(&json, "EA").unwrap().is_empty());
    }

    #[test]
    fn test_parse_search_news() {
        let json = json!({
            "news": [
                {
                    "uuid": "abc-123",
                    "title": "Take-Two shares jumps after GTA VI date",
                    "publisher": "Reuters",
                    "link": "https://finance.yahoo.com/news/gta",
                    "providerPublishTime": 1_714_550_000,
                    "thumbnail": { "resolutions": [ { "url": "https://img/1.jpg" } ] },
                    "relatedTickers": ["TTWO", "SONY"]
                },
                {
                    "title": "Embracer restructures",
                    "link": "https://finance.yahoo.com/news/embracer"
                },
                { "title": "", "link": "https://finance.yahoo.com/news/empty" },
                { "link": "https://finance.yahoo.com/news/untitled" }
            ]
        });

        let items = parse_search_news(&json, now());
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].id, "abc-123");
        assert_eq!(items[0].source, "Reuters");
        assert_eq!(items[0].datetime, 1_714_550_000_000);
        assert_eq!(items[0].image.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(items[0].related_tickers, "TTWO,SONY");
        assert_eq!(items[0].sentiment, Sentiment::Bullish);
        assert_eq!(items[0].category, "General");

        // 没有 uuid 时用链接作为 id，没有发布时间时用抓取时间
        assert_eq!(items[1].id, "https://finance.yahoo.com/news/embracer");
        assert_eq!(items[1].datetime, now().timestamp_millis());
        assert_eq!(items[1].related_tickers, "");
    }

    #[test]
    fn test_parse_search_news_without_news_field() {
        assert!(parse_search_news(&json!({ "quotes": [] }), now()).is_empty());
    }
}
