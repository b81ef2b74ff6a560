use crate::error::{Error, Result};
use crate::types::hashrate::Hashrate;
use crate::types::stat::MiningStat;

/// Expected coins per day for `hashrate` out of `network_hashrate` (both H/s).
///
/// A non-positive or non-finite network hashrate has no meaningful share and
/// is rejected rather than returning `NaN` or infinity.
pub fn calculate_mining_reward(
    hashrate: f64,
    network_hashrate: f64,
    block_reward: f64,
    blocks_per_day: f64,
) -> Result<f64> {
    if !network_hashrate.is_finite() || network_hashrate <= 0.0 {
        return Err(Error::NonPositiveNetworkHashrate(network_hashrate));
    }

    let share_of_network = hashrate / network_hashrate;
    Ok(share_of_network * block_reward * blocks_per_day)
}

/// `(pool / network) * 100`, on normalized hashrates.
pub fn network_share_percent(pool: Hashrate, network: Hashrate) -> Result<f64> {
    if network.is_zero() {
        return Err(Error::NonPositiveNetworkHashrate(network.as_hs()));
    }
    Ok(pool.as_hs() / network.as_hs() * 100.0)
}

/// USD value of everything minted network-wide in a day.
pub fn daily_emission_value_usd(stat: &MiningStat) -> f64 {
    stat.daily_emission * stat.price
}

#[derive(Clone, Debug, PartialEq)]
pub struct RewardEstimate {
    pub coins_per_day: f64,
    pub usd_per_day: f64,
}

/// Reward for a miner contributing `hashrate` to the network described by `stat`.
pub fn estimate_daily_revenue_usd(stat: &MiningStat, hashrate: Hashrate) -> Result<RewardEstimate> {
    let coins_per_day = calculate_mining_reward(
        hashrate.as_hs(),
        stat.net_hashrate.as_hs(),
        stat.block_reward,
        stat.blocks_per_day as f64,
    )?;

    Ok(RewardEstimate {
        coins_per_day,
        usd_per_day: coins_per_day * stat.price,
    })
}
