//! 模拟组合与排行榜数据模型

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 持仓
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub ticker: String,
    /// 持股数量
    pub shares: f64,
    /// 平均成本
    pub average_cost: f64,
}

/// 组合汇总请求
///
/// `prices` 缺省时由服务端按 ticker 查询当前价格
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRequest {
    pub positions: Vec<Position>,
    #[serde(default)]
    pub prices: Option<HashMap<String, f64>>,
}

/// 单个持仓的估值
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub ticker: String,
    pub shares: f64,
    pub average_cost: f64,
    /// 用于估值的价格（无报价时为平均成本）
    pub price: f64,
    pub market_value: f64,
    pub gain: f64,
    pub roi_percent: f64,
}

/// 组合汇总
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_invested: f64,
    pub current_value: f64,
    pub total_gain: f64,
    pub roi_percent: f64,
    pub positions: Vec<PositionValuation>,
}

/// 排行榜统计周期
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    All,
    Weekly,
    Monthly,
}

/// 排行榜查询参数
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub timeframe: Timeframe,
}

/// 排行榜条目
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    /// 持仓市值 + 现金
    pub total_value: f64,
    pub roi_percent: f64,
}

/// 市场情绪
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Bullish,
    Bearish,
    Mixed,
}

/// 市场简报
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketBriefing {
    pub status: MarketStatus,
    /// 代理 ticker 的平均涨跌幅
    pub average_change_percent: f64,
    /// 参与计算的 ticker
    pub tickers: Vec<String>,
}

/// 涨跌幅排行条目
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub ticker: String,
    pub name: Option<String>,
    pub price: f64,
    pub change_percent: f64,
}

/// 涨跌幅排行查询参数
#[derive(Debug, Deserialize)]
pub struct MoversQuery {
    pub limit: Option<usize>,
}
