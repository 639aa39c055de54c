//! 模拟组合估值与排行榜计算
//!
//! 纯函数，不访问网络和存储

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{
    LeaderboardEntry, PortfolioSummary, Position, PositionValuation, Profile, Timeframe,
};

/// 新用户的初始资金，也是缺少起始净值时的基准
pub const STARTING_CAPITAL: f64 = 10_000.0;

/// 排行榜返回条数
pub const LEADERBOARD_SIZE: usize = 20;

/// 排行榜读取的档案上限
pub const LEADERBOARD_FETCH_LIMIT: usize = 50;

fn roi(gain: f64, invested: f64) -> f64 {
    if invested == 0.0 {
        0.0
    } else {
        gain / invested * 100.0
    }
}

/// 计算组合收益
///
/// 没有报价或报价不大于 0 的持仓按平均成本估值
pub fn calculate_portfolio(positions: &[Position], prices: &HashMap<String, f64>) -> PortfolioSummary {
    let lines: Vec<PositionValuation> = positions
        .iter()
        .map(|p| {
            let price = prices
                .get(&p.ticker)
                .copied()
                .filter(|price| *price > 0.0)
                .unwrap_or(p.average_cost);
            let cost = p.shares * p.average_cost;
            let market_value = p.shares * price;
            let gain = market_value - cost;
            PositionValuation {
                ticker: p.ticker.clone(),
                shares: p.shares,
                average_cost: p.average_cost,
                price,
                market_value,
                gain,
                roi_percent: roi(gain, cost),
            }
        })
        .collect();

    let total_invested: f64 = positions.iter().map(|p| p.shares * p.average_cost).sum();
    let current_value: f64 = lines.iter().map(|l| l.market_value).sum();
    let total_gain = current_value - total_invested;

    PortfolioSummary {
        total_invested,
        current_value,
        total_gain,
        roi_percent: roi(total_gain, total_invested),
        positions: lines,
    }
}

fn baseline(profile: &Profile, timeframe: Timeframe) -> f64 {
    let start = match timeframe {
        Timeframe::All => None,
        Timeframe::Weekly => profile.weekly_start_equity,
        Timeframe::Monthly => profile.monthly_start_equity,
    };
    start.filter(|v| *v != 0.0).unwrap_or(STARTING_CAPITAL)
}

/// 按周期收益率排名，返回前 20 名
pub fn rank_leaderboard(profiles: Vec<Profile>, timeframe: Timeframe) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = profiles
        .into_iter()
        .map(|p| {
            let total_value = p.total_equity + p.balance;
            let base = baseline(&p, timeframe);
            LeaderboardEntry {
                rank: 0,
                roi_percent: (total_value - base) / base * 100.0,
                id: p.id,
                username: p.username,
                avatar_url: p.avatar_url,
                total_value,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.roi_percent
            .partial_cmp(&a.roi_percent)
            .unwrap_or(Ordering::Equal)
    });
    entries.truncate(LEADERBOARD_SIZE);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}
