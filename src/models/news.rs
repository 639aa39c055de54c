//! 新闻数据模型

use serde::{Deserialize, Serialize};

/// 标题情绪倾向
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

const BULLISH_KEYWORDS: &[&str] = &[
    "soars", "jumps", "surges", "record", "high", "profit", "beat", "growth", "up", "buy",
    "strong", "gains", "rally",
];
const BEARISH_KEYWORDS: &[&str] = &[
    "plunges", "drops", "falls", "low", "loss", "miss", "weak", "down", "sell", "crash", "slump",
    "cuts",
];

impl Sentiment {
    /// 基于关键词的标题情绪判断，先匹配看涨词
    ///
    /// 按子串匹配，"update" 这类包含 "up" 的词也会命中
    pub fn of_headline(headline: &str) -> Self {
        let lower = headline.to_lowercase();
        if BULLISH_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Sentiment::Bullish
        } else if BEARISH_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        }
    }
}

/// 统一的新闻条目
///
/// 由搜索接口或 RSS 源每次请求临时生成，`id` 只在单次响应内唯一
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewsItem {
    /// 唯一标识（上游 uuid / guid，缺失时取链接）
    pub id: String,
    /// 标题
    pub headline: String,
    /// 摘要
    pub summary: String,
    /// 来源媒体
    pub source: String,
    /// 原文链接
    pub url: String,
    /// 缩略图
    pub image: Option<String>,
    /// 发布时间（毫秒时间戳）
    pub datetime: i64,
    /// 分类
    pub category: String,
    /// 关联 ticker，逗号分隔
    #[serde(rename = "related")]
    pub related_tickers: String,
    /// 标题情绪
    pub sentiment: Sentiment,
}

/// 新闻查询参数
#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    /// 关键词或逗号分隔的 ticker 列表
    pub q: Option<String>,
}
