use anyhow::Result;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use super::ProfileStore;
use crate::models::Profile;

/// 进程内存储，重启后清空
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<Vec<Profile>>,
    /// user_id → 交易笔数
    transactions: RwLock<HashMap<String, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一笔交易
    #[cfg(test)]
    pub fn record_transaction(&self, user_id: &str) {
        let mut txs = self.transactions.write().unwrap_or_else(|e| e.into_inner());
        *txs.entry(user_id.to_string()).or_default() += 1;
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn list_profiles(&self, limit: usize) -> Result<Vec<Profile>> {
        let mut profiles = self
            .profiles
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        profiles.sort_by(|a, b| {
            b.total_equity
                .partial_cmp(&a.total_equity)
                .unwrap_or(Ordering::Equal)
        });
        profiles.truncate(limit);
        Ok(profiles)
    }

    async fn insert_profiles(&self, profiles: Vec<Profile>) -> Result<Vec<Profile>> {
        let mut stored = self.profiles.write().unwrap_or_else(|e| e.into_inner());
        if let Some(dup) = profiles.iter().find(|p| stored.iter().any(|s| s.id == p.id)) {
            anyhow::bail!("档案 id 已存在: {}", dup.id);
        }
        stored.extend(profiles.iter().cloned());
        Ok(profiles)
    }

    async fn find_ids_by_avatar(&self, fragment: &str) -> Result<Vec<String>> {
        let profiles = self.profiles.read().unwrap_or_else(|e| e.into_inner());
        Ok(profiles
            .iter()
            .filter(|p| p.avatar_url.as_deref().is_some_and(|a| a.contains(fragment)))
            .map(|p| p.id.clone())
            .collect())
    }

    async fn delete_transactions(&self, user_ids: &[String]) -> Result<usize> {
        let mut txs = self.transactions.write().unwrap_or_else(|e| e.into_inner());
        Ok(user_ids.iter().filter_map(|id| txs.remove(id)).sum())
    }

    async fn delete_profiles(&self, ids: &[String]) -> Result<usize> {
        let mut stored = self.profiles.write().unwrap_or_else(|e| e.into_inner());
        let before = stored.len();
        stored.retain(|p| !ids.contains(&p.id));
        Ok(before - stored.len())
    }
}
