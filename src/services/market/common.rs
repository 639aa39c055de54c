//! 公共常量和辅助函数

use chrono::{DateTime, Utc};
use serde_json::Value;

// ==================== Yahoo Finance API 常量 ====================

/// Yahoo 图表 API（报价和历史走势）
pub const YAHOO_CHART_API: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
/// Yahoo 搜索 API（新闻）
pub const YAHOO_SEARCH_API: &str = "https://query1.finance.yahoo.com/v1/finance/search";

/// 搜索新闻的默认分类
pub const DEFAULT_NEWS_CATEGORY: &str = "General";

/// 将秒级时间戳转换为毫秒，兼容已经是毫秒的值
pub fn epoch_to_millis(value: i64) -> i64 {
    // 1e12 毫秒约为 2001 年，秒级时间戳在可预见的未来不会超过它
    if value > 1_000_000_000_000 {
        value
    } else {
        value * 1000
    }
}

/// 解析上游时间字段：数字时间戳或 RFC 3339 字符串
pub fn parse_time_value(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(n) = value.as_i64() {
        return DateTime::from_timestamp_millis(epoch_to_millis(n));
    }
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
