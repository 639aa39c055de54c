//! 基于轮询快照的市场概览

use crate::models::{find_company, MarketBriefing, MarketStatus, Mover, QuoteSnapshot};

/// 代表游戏板块整体走势的 ticker
pub const PROXY_TICKERS: &[&str] = &["MSFT", "SONY", "NVDA", "NTDOY"];

/// 判定多空的平均涨跌幅阈值（百分比）
const STATUS_THRESHOLD: f64 = 0.5;

pub const DEFAULT_MOVERS: usize = 5;

/// 根据代理 ticker 的平均涨跌幅给出市场情绪
pub fn market_briefing(snapshot: &QuoteSnapshot) -> MarketBriefing {
    let present: Vec<(&str, f64)> = PROXY_TICKERS
        .iter()
        .filter_map(|t| snapshot.quotes.get(*t).map(|q| (*t, q.change_percent)))
        .collect();

    let average = if present.is_empty() {
        0.0
    } else {
        present.iter().map(|(_, c)| c).sum::<f64>() / present.len() as f64
    };

    let status = if present.is_empty() {
        MarketStatus::Mixed
    } else if average > STATUS_THRESHOLD {
        MarketStatus::Bullish
    } else if average < -STATUS_THRESHOLD {
        MarketStatus::Bearish
    } else {
        MarketStatus::Mixed
    };

    MarketBriefing {
        status,
        average_change_percent: average,
        tickers: present.into_iter().map(|(t, _)| t.to_string()).collect(),
    }
}

/// 涨跌幅绝对值最大的前 `limit` 只
pub fn top_movers(snapshot: &QuoteSnapshot, limit: usize) -> Vec<Mover> {
    let mut movers: Vec<Mover> = snapshot
        .quotes
        .iter()
        .map(|(ticker, q)| Mover {
            ticker: ticker.clone(),
            name: find_company(ticker).map(|c| c.name.to_string()),
            price: q.price,
            change_percent: q.change_percent,
        })
        .collect();

    // ticker 作为次序键，保证 HashMap 遍历顺序不影响结果
    movers.sort_by(|a, b| {
        b.change_percent
            .abs()
            .total_cmp(&a.change_percent.abs())
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    movers.truncate(limit);
    movers
}
