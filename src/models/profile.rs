//! 用户档案数据模型
//!
//! 对应关系型存储中的 `profiles` 表

use serde::{Deserialize, Deserializer, Serialize};

/// 未设置用户名时的显示名
const ANONYMOUS: &str = "Anonymous";

/// 列值为 null 时按类型默认值处理
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn anonymous() -> String {
    ANONYMOUS.to_string()
}

fn username_or_anonymous<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.filter(|n| !n.trim().is_empty()).unwrap_or_else(anonymous))
}

/// 用户档案
///
/// 存储层使用 snake_case 列名，与 PostgREST 返回的 JSON 一致
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    pub id: String,
    #[serde(default = "anonymous", deserialize_with = "username_or_anonymous")]
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// 持仓市值
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_equity: f64,
    /// 现金余额
    #[serde(default, deserialize_with = "null_as_default")]
    pub balance: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ranking_points: i64,
    /// 本周起始净值
    #[serde(default)]
    pub weekly_start_equity: Option<f64>,
    /// 本月起始净值
    #[serde(default)]
    pub monthly_start_equity: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// 测试数据生成结果
#[derive(Debug, Serialize)]
pub struct PopulateResult {
    pub count: usize,
    pub users: Vec<Profile>,
}

/// 删除结果
#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub count: usize,
}
