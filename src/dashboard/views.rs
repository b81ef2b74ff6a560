use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use crate::analytics::formatting::{
    format_difficulty, format_fixed, format_number, format_percent, format_price, format_timestamp, format_usd,
};
use crate::analytics::rewards::{
    daily_emission_value_usd, estimate_daily_revenue_usd, network_share_percent,
};
use crate::config::coins::CoinConfig;
use crate::dashboard::snapshot::DashboardState;
use crate::error::Result;
use crate::types::hashrate::Hashrate;
use crate::types::ids::CoinId;
use crate::types::stat::MiningStat;

/// Sortable table columns, one per `MiningStat` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Coin,
    Symbol,
    Algorithm,
    Price,
    NetHashrate,
    Difficulty,
    BlockReward,
    BlockTime,
    BlocksPerDay,
    #[default]
    DailyEmission,
    LastUpdated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

fn compare(a: &MiningStat, b: &MiningStat, key: SortKey) -> Ordering {
    match key {
        SortKey::Coin => a.coin.cmp(&b.coin),
        SortKey::Symbol => a.symbol.cmp(&b.symbol),
        SortKey::Algorithm => a.algorithm.cmp(&b.algorithm),
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::NetHashrate => a.net_hashrate.as_hs().total_cmp(&b.net_hashrate.as_hs()),
        SortKey::Difficulty => a.difficulty.total_cmp(&b.difficulty),
        SortKey::BlockReward => a.block_reward.total_cmp(&b.block_reward),
        SortKey::BlockTime => a.block_time.total_cmp(&b.block_time),
        SortKey::BlocksPerDay => a.blocks_per_day.cmp(&b.blocks_per_day),
        SortKey::DailyEmission => a.daily_emission.total_cmp(&b.daily_emission),
        SortKey::LastUpdated => a.last_updated.cmp(&b.last_updated),
    }
}

/// Stable sort: records that compare equal keep their aggregation order.
pub fn sort_stats(stats: &mut [MiningStat], config: SortConfig) {
    stats.sort_by(|a, b| {
        let ordering = compare(a, b, config.key);
        match config.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// One formatted table row.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinRow {
    pub id: CoinId,
    pub coin: String,
    pub symbol: String,
    pub algorithm: String,
    pub price: String,
    pub net_hashrate: String,
    pub difficulty: String,
    pub block_reward: String,
    pub daily_emission: String,
    pub detail_path: String,
}

impl From<&MiningStat> for CoinRow {
    fn from(stat: &MiningStat) -> Self {
        CoinRow {
            id: stat.id.clone(),
            coin: stat.coin.clone(),
            symbol: stat.symbol.clone(),
            algorithm: stat.algorithm.clone(),
            price: format_price(stat.price),
            net_hashrate: stat.net_hashrate.to_string(),
            difficulty: format_difficulty(stat.difficulty),
            block_reward: format_number(stat.block_reward),
            daily_emission: format_fixed(stat.daily_emission, 2),
            detail_path: format!("/coins/{}", stat.id),
        }
    }
}

/// What the table page shows for a given [`DashboardState`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DashboardView {
    Loading,
    /// Only reached when a whole cycle failed; offers a manual retry.
    #[serde(rename_all = "camelCase")]
    Error { message: String, retry_path: String },
    /// The last cycle succeeded but every source failed.
    NoData,
    #[serde(rename_all = "camelCase")]
    Ready {
        rows: Vec<CoinRow>,
        last_updated: String,
    },
}

impl DashboardView {
    pub fn from_state(state: &DashboardState, sort: SortConfig) -> Self {
        match state {
            DashboardState::Loading => DashboardView::Loading,
            DashboardState::Failed { message, .. } => DashboardView::Error {
                message: message.clone(),
                retry_path: "/api/mining/refresh".to_string(),
            },
            DashboardState::Ready { stats, .. } if stats.is_empty() => DashboardView::NoData,
            DashboardState::Ready { stats, refreshed_at } => {
                let mut sorted = stats.clone();
                sort_stats(&mut sorted, sort);
                DashboardView::Ready {
                    rows: sorted.iter().map(CoinRow::from).collect(),
                    last_updated: format_timestamp(refreshed_at),
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRow {
    pub name: String,
    pub hashrate: String,
    pub miners: Option<u64>,
    /// Absent when the network hashrate is zero.
    pub network_share: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningInfo {
    pub algorithm: String,
    pub net_hashrate: String,
    pub difficulty: String,
    pub block_reward: String,
    pub block_time: String,
    pub blocks_per_day: String,
    pub coins_per_day: String,
    pub daily_value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardView {
    pub hashrate: String,
    pub coins_per_day: String,
    pub usd_per_day: String,
}

/// Detail page for one coin.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinDetail {
    pub id: CoinId,
    pub name: String,
    pub symbol: String,
    pub price: String,
    pub mining: MiningInfo,
    pub pools: Vec<PoolRow>,
    pub estimate: Option<RewardView>,
    pub last_updated: String,
}

impl CoinDetail {
    /// Fails only when an estimate is requested against a zero network hashrate.
    pub fn build(coin: &CoinConfig, stat: &MiningStat, miner_hashrate: Option<Hashrate>) -> Result<Self> {
        let symbol = &stat.symbol;

        let pools = coin
            .pools
            .iter()
            .map(|pool| PoolRow {
                name: pool.name.clone(),
                hashrate: pool.hashrate.to_string(),
                miners: pool.miners,
                network_share: network_share_percent(pool.hashrate, stat.net_hashrate)
                    .ok()
                    .map(format_percent),
            })
            .collect();

        let estimate = match miner_hashrate {
            Some(hashrate) => {
                let reward = estimate_daily_revenue_usd(stat, hashrate)?;
                Some(RewardView {
                    hashrate: hashrate.to_string(),
                    coins_per_day: format!("{} {}", format_number(reward.coins_per_day), symbol),
                    usd_per_day: format_usd(reward.usd_per_day, 2, 2),
                })
            }
            None => None,
        };

        Ok(CoinDetail {
            id: stat.id.clone(),
            name: stat.coin.clone(),
            symbol: symbol.clone(),
            price: format_price(stat.price),
            mining: MiningInfo {
                algorithm: stat.algorithm.clone(),
                net_hashrate: stat.net_hashrate.to_string(),
                difficulty: format_difficulty(stat.difficulty),
                block_reward: format!("{} {}", format_number(stat.block_reward), symbol),
                block_time: format!("{} seconds", format_number(stat.block_time)),
                blocks_per_day: format_number(stat.blocks_per_day as f64),
                coins_per_day: format!("{} {}", format_number(stat.daily_emission), symbol),
                daily_value: format_usd(daily_emission_value_usd(stat), 0, 0),
            },
            pools,
            estimate,
            last_updated: format_timestamp(&stat.last_updated),
        })
    }
}
