pub mod formatting;
pub mod rewards;

pub use formatting::{
    format_difficulty, format_hashrate, format_number, format_percent, format_price,
    format_timestamp, format_usd,
};
pub use rewards::{
    calculate_mining_reward, daily_emission_value_usd, estimate_daily_revenue_usd,
    network_share_percent, RewardEstimate,
};
