//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，敏感字段可由环境变量覆盖

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::models::seed_tickers;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 上游 HTTP 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 请求上游时使用的 User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 缓存有效期配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 报价缓存（秒）
    #[serde(default = "default_quote_ttl")]
    pub quote_ttl_secs: u64,
    /// 新闻缓存（秒）
    #[serde(default = "default_news_ttl")]
    pub news_ttl_secs: u64,
    /// 历史走势缓存（秒）
    #[serde(default = "default_history_ttl")]
    pub history_ttl_secs: u64,
}

/// 报价轮询配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// 是否在服务端轮询 watchlist
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 轮询间隔（秒）
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
    /// 轮询的 ticker 列表，默认使用种子公司
    #[serde(default = "seed_tickers")]
    pub tickers: Vec<String>,
}

/// RSS 源
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedConfig {
    /// 来源名称
    pub source: String,
    /// 订阅地址
    pub url: String,
}

/// 新闻聚合配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// 未指定查询时使用的通用主题，同时决定是否合并 RSS
    #[serde(default = "default_news_query")]
    pub default_query: String,
    /// 每次搜索请求的新闻条数
    #[serde(default = "default_news_count")]
    pub news_count: usize,
    /// 逗号分隔查询最多并发的 ticker 数
    #[serde(default = "default_max_tickers")]
    pub max_tickers: usize,
    /// 单个 RSS 源超时（秒）
    #[serde(default = "default_rss_timeout")]
    pub rss_timeout_secs: u64,
    /// 新闻最大保留天数
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
    /// RSS 源列表
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedConfig>,
}

/// 管理接口配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
}

/// 关系型存储配置（Supabase PostgREST）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// 项目地址，如 https://xyz.supabase.co（为空则使用内存存储）
    #[serde(default)]
    pub supabase_url: String,
    /// service role key
    #[serde(default)]
    pub service_key: String,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 上游 HTTP 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}
fn default_log_level() -> String { "info".to_string() }
fn default_quote_ttl() -> u64 { 60 }
fn default_news_ttl() -> u64 { 5 * 60 }
fn default_history_ttl() -> u64 { 15 * 60 }
fn default_true() -> bool { true }
fn default_poll_interval() -> u64 { 60 }
fn default_news_query() -> String { "gaming".to_string() }
fn default_news_count() -> usize { 10 }
fn default_max_tickers() -> usize { 5 }
fn default_rss_timeout() -> u64 { 5 }
fn default_max_age_days() -> i64 { 30 }
fn default_feeds() -> Vec<FeedConfig> {
    vec![
        FeedConfig {
            source: "GamesIndustry.biz".to_string(),
            url: "https://www.gamesindustry.biz/feed/news".to_string(),
        },
        FeedConfig {
            source: "Game Developer".to_string(),
            url: "https://www.gamedeveloper.com/rss.xml".to_string(),
        },
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            quote_ttl_secs: default_quote_ttl(),
            news_ttl_secs: default_news_ttl(),
            history_ttl_secs: default_history_ttl(),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_poll_interval(),
            tickers: seed_tickers(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            default_query: default_news_query(),
            news_count: default_news_count(),
            max_tickers: default_max_tickers(),
            rss_timeout_secs: default_rss_timeout(),
            max_age_days: default_max_age_days(),
            feeds: default_feeds(),
        }
    }
}

impl CacheConfig {
    pub fn quote_ttl(&self) -> Duration { Duration::from_secs(self.quote_ttl_secs) }
    pub fn news_ttl(&self) -> Duration { Duration::from_secs(self.news_ttl_secs) }
    pub fn history_ttl(&self) -> Duration { Duration::from_secs(self.history_ttl_secs) }
}

impl StoreConfig {
    /// 是否配置了远程存储
    pub fn is_remote(&self) -> bool {
        !self.supabase_url.trim().is_empty() && !self.service_key.trim().is_empty()
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值，最后应用环境变量覆盖
    pub fn load() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        let mut config = None;
        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(c) => {
                        log::info!("从 {} 加载配置成功", path);
                        config = Some(c);
                        break;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        let mut config = config.unwrap_or_else(|| {
            log::info!("使用默认配置");
            Self::default()
        });
        config.apply_env_overrides(|key| env::var(key).ok());
        config
    }

    /// 环境变量覆盖：ADMIN_API_KEY, SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ADMIN_API_KEY") {
            self.admin.api_key = key;
        }
        if let Some(url) = lookup("SUPABASE_URL") {
            self.store.supabase_url = url;
        }
        if let Some(key) = lookup("SUPABASE_SERVICE_ROLE_KEY") {
            self.store.service_key = key;
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
