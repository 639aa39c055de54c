//! 时钟抽象
//!
//! 缓存、轮询器和新闻聚合都通过注入的时钟读取当前时间，测试中替换为手动时钟

use chrono::{DateTime, Utc};

/// 时间来源
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;
