//! 用户档案存储
//!
//! 配置了 Supabase 时走 PostgREST，否则使用进程内存储

mod memory;
mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Profile;

/// 档案存储接口
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// 读取最多 `limit` 条档案，按持仓市值倒序
    async fn list_profiles(&self, limit: usize) -> Result<Vec<Profile>>;

    /// 批量插入，返回写入后的档案
    async fn insert_profiles(&self, profiles: Vec<Profile>) -> Result<Vec<Profile>>;

    /// 头像地址包含 `fragment` 的档案 id
    async fn find_ids_by_avatar(&self, fragment: &str) -> Result<Vec<String>>;

    /// 删除这些用户的交易记录，返回删除条数
    async fn delete_transactions(&self, user_ids: &[String]) -> Result<usize>;

    /// 删除档案，返回删除条数
    async fn delete_profiles(&self, ids: &[String]) -> Result<usize>;
}
