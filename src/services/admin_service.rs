//! 管理接口：测试用户生成与清理
//!
//! 测试用户通过 DiceBear 头像识别，清理时先删交易记录再删档案

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::models::{DeleteResult, PopulateResult, Profile};
use crate::services::store::ProfileStore;

/// 每次生成的测试用户数
pub const BOT_BATCH_SIZE: usize = 10;

/// 测试用户头像地址中的标识
pub const BOT_AVATAR_MARKER: &str = "dicebear.com";

const AVATAR_BASE: &str = "https://api.dicebear.com/9.x/pixel-art/svg?seed=";

const USERNAME_PREFIXES: &[&str] = &[
    "Pixel", "Cyber", "Retro", "Neon", "Meta", "Crypto", "Game", "Tech", "Code", "Byte",
];
const USERNAME_SUFFIXES: &[&str] = &[
    "Hunter", "Master", "Ninja", "Guru", "Wizard", "Lord", "King", "Queen", "Shadow", "Light",
];
const USERNAME_NUMBERS: &[&str] = &["77", "99", "101", "404", "3000", "X", "Z"];

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

/// 生成一个随机测试用户
///
/// 净值 10k–60k，现金 0–5k，周收益率 -10%..+30%（反推周起始净值），
/// 月起始净值为周起始净值的 95%
pub fn generate_bot<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Profile {
    let username = format!(
        "{}{}{}",
        pick(rng, USERNAME_PREFIXES),
        pick(rng, USERNAME_SUFFIXES),
        pick(rng, USERNAME_NUMBERS)
    );
    let seed: String = (0..8)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
        .collect();

    let total_equity = rng.random_range(10_000.0..60_000.0);
    let balance = rng.random_range(0.0..5_000.0);
    let roi_percent: f64 = rng.random_range(-10.0..30.0);
    let start_equity = total_equity / (1.0 + roi_percent / 100.0);

    Profile {
        id: Uuid::new_v4().to_string(),
        username,
        avatar_url: Some(format!("{}{}", AVATAR_BASE, seed)),
        total_equity,
        balance,
        ranking_points: (total_equity * 0.1).floor() as i64,
        weekly_start_equity: Some(start_equity),
        monthly_start_equity: Some(start_equity * 0.95),
        updated_at: Some(now.to_rfc3339()),
    }
}

/// 生成并写入一批测试用户
pub async fn populate_bots(store: &dyn ProfileStore, now: DateTime<Utc>) -> Result<PopulateResult> {
    let bots: Vec<Profile> = {
        let mut rng = rand::rng();
        (0..BOT_BATCH_SIZE).map(|_| generate_bot(&mut rng, now)).collect()
    };
    let users = store.insert_profiles(bots).await?;
    log::info!("已生成 {} 个测试用户", users.len());
    Ok(PopulateResult {
        count: users.len(),
        users,
    })
}

/// 清理所有测试用户及其交易记录
pub async fn purge_bots(store: &dyn ProfileStore) -> Result<DeleteResult> {
    let ids = store.find_ids_by_avatar(BOT_AVATAR_MARKER).await?;
    log::info!("检测到 {} 个测试用户", ids.len());
    if ids.is_empty() {
        return Ok(DeleteResult { count: 0 });
    }

    let txs = store.delete_transactions(&ids).await?;
    let count = store.delete_profiles(&ids).await?;
    log::info!("已清理 {} 个测试用户, {} 笔交易", count, txs);
    Ok(DeleteResult { count })
}

/// 删除单个用户（先交易记录后档案）
pub async fn delete_user(store: &dyn ProfileStore, id: &str) -> Result<DeleteResult> {
    let ids = [id.to_string()];
    store.delete_transactions(&ids).await?;
    let count = store.delete_profiles(&ids).await?;
    log::info!("删除用户 {}: {} 条档案", id, count);
    Ok(DeleteResult { count })
}
