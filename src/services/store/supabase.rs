//! Supabase (PostgREST) 存储
//!
//! 使用 service role key 访问 `profiles` 与 `transactions` 表

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

use super::ProfileStore;
use crate::models::Profile;

const PROFILES: &str = "profiles";
const TRANSACTIONS: &str = "transactions";

#[derive(Debug, Deserialize)]
struct IdRow {
    id: String,
}

pub struct SupabaseStore {
    client: Client,
    base: Url,
    service_key: String,
}

impl SupabaseStore {
    pub fn new(client: Client, supabase_url: &str, service_key: &str) -> Result<Self> {
        let base = Url::parse(supabase_url)
            .map_err(|e| anyhow!("无效的 Supabase 地址 {}: {}", supabase_url, e))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("无效的 Supabase 地址: {}", supabase_url));
        }
        Ok(Self {
            client,
            base,
            service_key: service_key.to_string(),
        })
    }

    /// `{base}/rest/v1/{table}`
    fn table_url(&self, table: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("无效的 Supabase 地址"))?
            .pop_if_empty()
            .extend(["rest", "v1", table]);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    async fn check(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(anyhow!("{} 失败: {} {}", action, status, body))
    }

    async fn delete_where(&self, table: &str, column: &str, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let url = self.table_url(table)?;
        let response = self
            .authorized(self.client.delete(url))
            .query(&[(column, in_filter(ids)), ("select", "id".to_string())])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<IdRow> = Self::check(response, &format!("删除 {}", table))
            .await?
            .json()
            .await?;
        Ok(rows.len())
    }
}

/// PostgREST `in` 过滤表达式
fn in_filter(values: &[String]) -> String {
    format!("in.({})", values.join(","))
}

#[async_trait]
impl ProfileStore for SupabaseStore {
    async fn list_profiles(&self, limit: usize) -> Result<Vec<Profile>> {
        let url = self.table_url(PROFILES)?;
        let response = self
            .authorized(self.client.get(url))
            .query(&[
                ("select", "*".to_string()),
                ("order", "total_equity.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;
        Ok(Self::check(response, "读取档案").await?.json().await?)
    }

    async fn insert_profiles(&self, profiles: Vec<Profile>) -> Result<Vec<Profile>> {
        let url = self.table_url(PROFILES)?;
        let response = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(&profiles)
            .send()
            .await?;
        Ok(Self::check(response, "写入档案").await?.json().await?)
    }

    async fn find_ids_by_avatar(&self, fragment: &str) -> Result<Vec<String>> {
        let url = self.table_url(PROFILES)?;
        let response = self
            .authorized(self.client.get(url))
            .query(&[
                ("select", "id".to_string()),
                ("avatar_url", format!("like.*{}*", fragment)),
            ])
            .send()
            .await?;
        let rows: Vec<IdRow> = Self::check(response, "查询档案").await?.json().await?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn delete_transactions(&self, user_ids: &[String]) -> Result<usize> {
        self.delete_where(TRANSACTIONS, "user_id", user_ids).await
    }

    async fn delete_profiles(&self, ids: &[String]) -> Result<usize> {
        self.delete_where(PROFILES, "id", ids).await
    }
}
