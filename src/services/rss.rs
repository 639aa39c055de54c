//! RSS 新闻源
//!
//! 并发抓取配置中的 RSS / Atom 源，每个源单独限时，
//! 超时、网络错误或解析失败的源贡献 0 条，不影响其他源

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;

use crate::config::FeedConfig;
use crate::models::{NewsItem, Sentiment};
use crate::services::provider::FeedSource;

/// RSS 条目的分类
pub const RSS_CATEGORY: &str = "Industry";

/// 摘要最大字符数
const SNIPPET_MAX_CHARS: usize = 300;

/// 通过 HTTP 抓取 RSS
///
/// 按 XML 声明中的 encoding 解码，未声明时按 UTF-8 处理
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_feed(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/rss+xml, application/atom+xml, application/xml, text/xml")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("获取 RSS 失败: {}", response.status()));
        }

        let bytes = response.bytes().await?;
        Ok(decode_feed_bytes(&bytes))
    }
}

/// 按 XML 声明的编码解码
fn decode_feed_bytes(bytes: &[u8]) -> String {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(200)]);
    let encoding = declared_encoding(&head)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);
    encoding.decode(bytes).0.into_owned()
}

fn declared_encoding(head: &str) -> Option<String> {
    let start = head.find("<?xml")?;
    let decl = &head[start..start + head[start..].find("?>")?];
    let pos = decl.find("encoding=")?;
    let rest = &decl[pos + "encoding=".len()..];
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let end = value.find(quote)?;
    Some(value[..end].to_string())
}

/// 从单个 RSS / Atom 文档中解析出的条目
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub snippet: String,
}

/// RSS 2.0 / Atom 解析器
///
/// 只提取标题、链接、id、发布时间和摘要几个字段
pub struct FeedParser {
    item: Regex,
    entry: Regex,
    title: Regex,
    link: Regex,
    atom_link: Regex,
    guid: Regex,
    atom_id: Regex,
    pub_date: Regex,
    atom_date: Regex,
    description: Regex,
    atom_summary: Regex,
    cdata: Regex,
}

fn tag_regex(tag: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(r"(?s)<{tag}\b[^>]*>(.*?)</{tag}>"))?)
}

impl FeedParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            item: Regex::new(r"(?s)<item\b[^>]*>(.*?)</item>")?,
            entry: Regex::new(r"(?s)<entry\b[^>]*>(.*?)</entry>")?,
            title: tag_regex("title")?,
            link: tag_regex("link")?,
            atom_link: Regex::new(r#"<link\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#)?,
            guid: tag_regex("guid")?,
            atom_id: tag_regex("id")?,
            pub_date: tag_regex("pubDate")?,
            atom_date: Regex::new(r"(?s)<(published|updated|dc:date)\b[^>]*>(.*?)</(?:published|updated|dc:date)>")?,
            description: Regex::new(r"(?s)<(description|content:encoded)\b[^>]*>(.*?)</(?:description|content:encoded)>")?,
            atom_summary: Regex::new(r"(?s)<(summary|content)\b[^>]*>(.*?)</(?:summary|content)>")?,
            cdata: Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>")?,
        })
    }

    /// 解析文档，RSS `<item>` 优先，没有时按 Atom `<entry>` 解析
    pub fn parse(&self, xml: &str) -> Vec<FeedEntry> {
        let rss: Vec<FeedEntry> = self
            .item
            .captures_iter(xml)
            .map(|c| self.parse_rss_item(&c[1]))
            .collect();
        if !rss.is_empty() {
            return rss;
        }

        self.entry
            .captures_iter(xml)
            .map(|c| self.parse_atom_entry(&c[1]))
            .collect()
    }

    fn parse_rss_item(&self, body: &str) -> FeedEntry {
        let published = self
            .capture(&self.pub_date, body, 1)
            .and_then(|s| parse_feed_date(&s))
            .or_else(|| self.capture(&self.atom_date, body, 2).and_then(|s| parse_feed_date(&s)));

        FeedEntry {
            id: self.capture(&self.guid, body, 1).map(|s| self.text(&s)),
            title: self.capture(&self.title, body, 1).map(|s| self.text(&s)),
            link: self.capture(&self.link, body, 1).map(|s| self.text(&s)),
            published,
            snippet: self
                .capture(&self.description, body, 2)
                .map(|s| snippet(&self.text(&s)))
                .unwrap_or_default(),
        }
    }

    fn parse_atom_entry(&self, body: &str) -> FeedEntry {
        FeedEntry {
            id: self.capture(&self.atom_id, body, 1).map(|s| self.text(&s)),
            title: self.capture(&self.title, body, 1).map(|s| self.text(&s)),
            link: self
                .atom_link
                .captures(body)
                .map(|c| decode_entities(c[1].trim())),
            published: self
                .capture(&self.atom_date, body, 2)
                .and_then(|s| parse_feed_date(&s)),
            snippet: self
                .capture(&self.atom_summary, body, 2)
                .map(|s| snippet(&self.text(&s)))
                .unwrap_or_default(),
        }
    }

    fn capture(&self, re: &Regex, body: &str, group: usize) -> Option<String> {
        re.captures(body)
            .and_then(|c| c.get(group))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// 去掉 CDATA 包装、反转义实体并剥离 HTML 标签
    fn text(&self, raw: &str) -> String {
        let unwrapped = match self.cdata.captures(raw) {
            Some(c) => c[1].to_string(),
            None => decode_entities(raw),
        };
        strip_html(&unwrapped)
    }
}

/// 解析 RSS（RFC 2822）或 Atom（RFC 3339）时间
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// 用 HTML 解析器提取纯文本并压缩空白
fn strip_html(html: &str) -> String {
    if !html.contains('<') && !html.contains('&') {
        return html.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
    cut.push('…');
    cut
}

/// RSS 聚合器
pub struct RssAggregator {
    source: Arc<dyn FeedSource>,
    feeds: Vec<FeedConfig>,
    timeout: Duration,
    parser: FeedParser,
}

impl RssAggregator {
    pub fn new(source: Arc<dyn FeedSource>, feeds: Vec<FeedConfig>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            source,
            feeds,
            timeout,
            parser: FeedParser::new()?,
        })
    }

    /// 并发抓取所有源，按配置顺序拼接
    ///
    /// 没有可解析发布时间的条目被丢弃，其余过滤交给调用方
    pub async fn fetch_all(&self) -> Vec<NewsItem> {
        let results = join_all(self.feeds.iter().map(|feed| self.fetch_one(feed))).await;
        results.into_iter().flatten().collect()
    }

    async fn fetch_one(&self, feed: &FeedConfig) -> Vec<NewsItem> {
        log::debug!("抓取 RSS: {}", feed.url);
        let body = match tokio::time::timeout(self.timeout, self.source.fetch_feed(&feed.url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                log::warn!("RSS 源 {} 抓取失败: {:#}", feed.source, e);
                return Vec::new();
            }
            Err(_) => {
                log::warn!("RSS 源 {} 超时 ({:?})", feed.source, self.timeout);
                return Vec::new();
            }
        };

        let entries = self.parser.parse(&body);
        if entries.is_empty() {
            log::warn!("RSS 源 {} 未解析到任何条目", feed.source);
        }

        let items: Vec<NewsItem> = entries
            .into_iter()
            .filter_map(|entry| to_news_item(entry, &feed.source))
            .collect();
        log::debug!("RSS 源 {} 获得 {} 条", feed.source, items.len());
        items
    }
}

fn to_news_item(entry: FeedEntry, source: &str) -> Option<NewsItem> {
    let published = entry.published?;
    if entry.title.is_none() && entry.link.is_none() {
        return None;
    }

    let url = entry.link.unwrap_or_default();
    let id = entry
        .id
        .or_else(|| Some(url.clone()).filter(|u| !u.is_empty()))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let headline = entry.title.unwrap_or_else(|| "No Title".to_string());

    Some(NewsItem {
        id,
        sentiment: Sentiment::of_headline(&headline),
        headline,
        summary: entry.snippet,
        source: source.to_string(),
        url,
        image: None,
        datetime: published.timestamp_millis(),
        category: RSS_CATEGORY.to_string(),
        related_tickers: String::new(),
    })
}
