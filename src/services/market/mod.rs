//! 行情与新闻搜索数据源
//!
//! 目前对接 Yahoo Finance，服务层通过 `provider` 中的 trait 使用

mod common;
pub mod yahoo;

pub use yahoo::YahooProvider;
