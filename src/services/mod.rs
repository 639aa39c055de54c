//! 业务逻辑服务模块
//!
//! 封装数据获取、缓存和计算逻辑

pub mod admin_service;     // 测试用户管理
pub mod market;            // Yahoo Finance 数据源
pub mod market_service;    // 市场概览
pub mod news_service;      // 新闻聚合
pub mod poller;            // 报价轮询
pub mod portfolio_service; // 组合估值与排行榜
pub mod provider;          // 数据源 trait
pub mod quote_service;     // 报价与历史走势
pub mod rss;               // RSS 抓取与解析
pub mod store;             // 用户档案存储

#[cfg(test)]
pub mod testing;
