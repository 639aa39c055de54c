//! 报价轮询器
//!
//! 启动后立即轮询一次，之后按固定间隔重复，直到 `stop` 或被 drop。
//! 每次轮询对所有 ticker 并发请求：成功的覆盖对应条目，失败的保留旧值，
//! 只要有一个失败就设置通用错误标记。

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::models::{Quote, QuoteSnapshot};
use crate::services::quote_service::QuoteService;

/// 刷新失败时对外暴露的提示
pub const REFRESH_FAILED: &str = "Failed to refresh data";

struct PollerInner {
    quotes: Arc<QuoteService>,
    tickers: Vec<String>,
    clock: Arc<dyn Clock>,
    state: RwLock<QuoteSnapshot>,
}

impl PollerInner {
    async fn poll(&self) {
        let results = join_all(self.tickers.iter().map(|ticker| async move {
            (ticker, self.quotes.get_quote(ticker).await)
        }))
        .await;

        let mut fresh: HashMap<String, Quote> = HashMap::new();
        let mut failed = 0usize;
        for (ticker, res) in results {
            match res {
                Ok(quote) => {
                    fresh.insert(ticker.clone(), quote);
                }
                Err(e) => {
                    failed += 1;
                    log::debug!("轮询 {} 失败: {:#}", ticker, e);
                }
            }
        }

        if failed > 0 {
            log::warn!("本轮轮询 {}/{} 个 ticker 失败", failed, self.tickers.len());
        }

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.quotes.extend(fresh);
        state.loading = false;
        state.error = (failed > 0).then(|| REFRESH_FAILED.to_string());
        state.last_updated = Some(self.clock.now());
    }
}

/// 报价轮询器句柄
pub struct QuotePoller {
    inner: Arc<PollerInner>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl QuotePoller {
    /// 创建轮询器但不启动定时任务
    pub fn new(quotes: Arc<QuoteService>, tickers: Vec<String>, clock: Arc<dyn Clock>) -> Self {
        let mut unique = Vec::with_capacity(tickers.len());
        for t in tickers {
            if !unique.contains(&t) {
                unique.push(t);
            }
        }

        Self {
            inner: Arc::new(PollerInner {
                quotes,
                tickers: unique,
                clock,
                state: RwLock::new(QuoteSnapshot {
                    loading: true,
                    ..QuoteSnapshot::default()
                }),
            }),
            handle: Mutex::new(None),
        }
    }

    /// 创建并启动轮询，第一次轮询立即执行
    ///
    /// 需要在 tokio 运行时内调用
    pub fn start(
        quotes: Arc<QuoteService>,
        tickers: Vec<String>,
        interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let poller = Self::new(quotes, tickers, clock);
        let inner = poller.inner.clone();

        log::info!(
            "启动报价轮询: {} 个 ticker, 间隔 {:?}",
            inner.tickers.len(),
            interval
        );

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                // 第一次 tick 立即返回
                ticker.tick().await;
                inner.poll().await;
            }
        });
        *poller.handle.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        poller
    }

    /// 手动执行一次轮询
    pub async fn refresh(&self) {
        self.inner.poll().await;
    }

    /// 当前快照
    pub fn snapshot(&self) -> QuoteSnapshot {
        self.inner
            .state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 停止定时任务，已有快照保留
    pub fn stop(&self) {
        let handle = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            handle.abort();
            log::info!("报价轮询已停止");
        }
    }
}

impl Drop for QuotePoller {
    fn drop(&mut self) {
        self.stop();
    }
}
