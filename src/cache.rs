//! 带 TTL 的内存缓存
//!
//! 每个进程构造一次，按请求签名（如 `quote:EA`）存放上游数据。
//! 过期条目不会被主动清除，`get_stale` 可以在上游失败时读取最后一次成功的值。

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::clock::Clock;

struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// TTL 缓存
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // 持锁期间不会 panic，中毒时直接沿用内部数据
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 读取未过期的条目
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entries = self.lock();
        let entry = entries.get(key)?;
        // 时钟回拨时按刚写入处理
        let age = (now - entry.stored_at).to_std().unwrap_or_default();
        if age < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// 读取条目，不论是否过期
    pub fn get_stale(&self, key: &str) -> Option<V> {
        self.lock().get(key).map(|e| e.value.clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        let stored_at = self.clock.now();
        self.insert_at(key.into(), value, stored_at);
    }

    fn insert_at(&self, key: String, value: V, stored_at: DateTime<Utc>) {
        self.lock().insert(key, CacheEntry { value, stored_at });
    }

    /// 命中则返回缓存值，否则调用 `fetch` 并在成功时写入缓存
    ///
    /// 条目时间记为请求发起时刻，上游耗时不会延长有效期。
    /// 同一个 key 的并发未命中不会合并，最后返回的请求覆盖缓存
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(key) {
            log::debug!("缓存命中: {}", key);
            return Ok(hit);
        }

        let started = self.clock.now();
        let value = fetch().await?;
        self.insert_at(key.to_string(), value.clone(), started);
        Ok(value)
    }
}
