//! 行情数据模型
//!
//! 定义报价、历史走势和轮询快照的数据结构

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 实时报价
///
/// 字段名与前端约定保持 camelCase
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// 当前价格
    pub price: f64,
    /// 涨跌额
    pub change: f64,
    /// 涨跌幅（百分比）
    pub change_percent: f64,
    /// 行情时间（毫秒时间戳）
    pub last_updated: i64,
}

impl Quote {
    /// 上游不可用且没有历史值时返回的零值报价
    pub fn zero(now: DateTime<Utc>) -> Self {
        Self {
            price: 0.0,
            change: 0.0,
            change_percent: 0.0,
            last_updated: now.timestamp_millis(),
        }
    }
}

/// 历史走势中的单个点
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryPoint {
    /// 时间（RFC 3339）
    pub date: String,
    /// 收盘价
    pub close: f64,
    /// 成交量
    pub volume: u64,
}

/// K线粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryInterval {
    FifteenMinutes,
    SixtyMinutes,
    OneDay,
}

impl HistoryInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryInterval::FifteenMinutes => "15m",
            HistoryInterval::SixtyMinutes => "60m",
            HistoryInterval::OneDay => "1d",
        }
    }
}

/// 图表时间范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    OneDay,
    FiveDays,
    OneMonth,
    SixMonths,
    OneYear,
}

impl HistoryRange {
    /// 解析前端传入的范围，无法识别时按 6M 处理
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_uppercase()).as_deref() {
            Some("1D") => HistoryRange::OneDay,
            Some("5D") => HistoryRange::FiveDays,
            Some("1M") => HistoryRange::OneMonth,
            Some("1Y") => HistoryRange::OneYear,
            _ => HistoryRange::SixMonths,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::OneDay => "1D",
            HistoryRange::FiveDays => "5D",
            HistoryRange::OneMonth => "1M",
            HistoryRange::SixMonths => "6M",
            HistoryRange::OneYear => "1Y",
        }
    }

    /// 计算请求起点和粒度
    ///
    /// 日内数据多取几天，保证周末和节假日后仍能拿到最近一个交易日
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, HistoryInterval) {
        let months_back = |n: u32| now.checked_sub_months(Months::new(n)).unwrap_or(now);
        match self {
            HistoryRange::OneDay => (now - Duration::days(7), HistoryInterval::FifteenMinutes),
            HistoryRange::FiveDays => (now - Duration::days(14), HistoryInterval::SixtyMinutes),
            HistoryRange::OneMonth => (months_back(1), HistoryInterval::OneDay),
            HistoryRange::SixMonths => (months_back(6), HistoryInterval::OneDay),
            HistoryRange::OneYear => (months_back(12), HistoryInterval::OneDay),
        }
    }
}

/// 历史走势查询参数
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// 时间范围：1D, 5D, 1M, 6M, 1Y
    pub range: Option<String>,
}

/// 轮询器对外暴露的快照
#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    /// ticker -> 最近一次成功的报价
    pub quotes: HashMap<String, Quote>,
    /// 首次轮询尚未完成
    pub loading: bool,
    /// 最近一次轮询存在失败时的通用提示
    pub error: Option<String>,
    /// 最近一次轮询完成时间
    pub last_updated: Option<DateTime<Utc>>,
}

/// 规范化 ticker：去空白、转大写，只允许字母数字和 `.-^=`
///
/// 返回 None 表示输入不是合法的 ticker
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() || ticker.len() > 20 {
        return None;
    }
    let valid = ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if valid {
        Some(ticker)
    } else {
        None
    }
}
