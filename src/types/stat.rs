use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::config::coins::CoinConfig;
use crate::error::{Error, Result};
use crate::types::hashrate::Hashrate;
use crate::types::ids::CoinId;
use crate::SECONDS_PER_DAY;

/// What an adapter reads from its upstream payload, already in base units.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceReading {
    pub price_usd: f64,
    pub net_hashrate: Hashrate,
    pub difficulty: f64,
    /// Present only when the upstream reports block spacing.
    pub block_time_secs: Option<f64>,
}

/// Normalized statistics for one coin in one aggregation cycle.
///
/// Only built through [`MiningStat::from_reading`]: `blocks_per_day` and
/// `daily_emission` are derived from `block_time` and `block_reward`, never
/// read from upstream.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningStat {
    pub id: CoinId,
    pub coin: String,
    pub symbol: String,
    pub algorithm: String,
    pub price: f64,
    pub net_hashrate: Hashrate,
    pub difficulty: f64,
    pub block_reward: f64,
    pub block_time: f64,
    pub blocks_per_day: u64,
    pub daily_emission: f64,
    pub last_updated: DateTime<Utc>,
}

impl MiningStat {
    pub fn from_reading(
        coin: &CoinConfig,
        reading: SourceReading,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self> {
        let block_time = reading
            .block_time_secs
            .or(coin.block_time_secs)
            .ok_or_else(|| Error::ConfigError(format!("no block time known for {}", coin.id)))?;

        if !block_time.is_finite() || block_time <= 0.0 {
            return Err(Error::InvalidField {
                source_id: coin.id.to_string(),
                field: "block_time",
                value: block_time,
            });
        }

        let blocks_per_day = blocks_per_day(block_time);

        Ok(MiningStat {
            id: coin.id.clone(),
            coin: coin.name.clone(),
            symbol: coin.symbol.to_uppercase(),
            algorithm: coin.algorithm.clone(),
            price: reading.price_usd,
            net_hashrate: reading.net_hashrate,
            difficulty: reading.difficulty,
            block_reward: coin.block_reward,
            block_time,
            blocks_per_day,
            daily_emission: coin.block_reward * blocks_per_day as f64,
            last_updated: fetched_at,
        })
    }
}

/// `floor(86400 / block_time)`; `block_time` must be positive.
pub fn blocks_per_day(block_time_secs: f64) -> u64 {
    (SECONDS_PER_DAY / block_time_secs).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::coins::{CoinConfig, SourceKind};
    use proptest::prelude::*;

    fn litecoin(block_time_secs: Option<f64>, block_reward: f64) -> CoinConfig {
        CoinConfig {
            id: CoinId::new("litecoin"),
            name: "Litecoin".to_string(),
            symbol: "ltc".to_string(),
            algorithm: "Scrypt".to_string(),
            block_reward,
            block_time_secs,
            source: SourceKind::Blockchair {
                url: "https://api.blockchair.com/litecoin/stats".to_string(),
            },
            pools: vec![],
        }
    }

    fn reading(block_time_secs: Option<f64>) -> SourceReading {
        SourceReading {
            price_usd: 84.12,
            net_hashrate: Hashrate::from_hs(1.9e15).unwrap(),
            difficulty: 3.6e7,
            block_time_secs,
        }
    }

    #[test]
    fn derives_daily_figures_from_configured_block_time() {
        let stat = MiningStat::from_reading(&litecoin(Some(150.0), 6.25), reading(None), Utc::now()).unwrap();
        assert_eq!(stat.block_time, 150.0);
        assert_eq!(stat.blocks_per_day, 576);
        assert_eq!(stat.daily_emission, 3600.0);
        assert_eq!(stat.symbol, "LTC");
    }

    #[test]
    fn upstream_block_time_takes_precedence() {
        // 9.5 minutes between blocks
        let stat = MiningStat::from_reading(&litecoin(Some(150.0), 3.125), reading(Some(570.0)), Utc::now()).unwrap();
        assert_eq!(stat.block_time, 570.0);
        assert_eq!(stat.blocks_per_day, 151);
        assert_eq!(stat.daily_emission, 3.125 * 151.0);
    }

    #[test]
    fn rejects_missing_or_non_positive_block_time() {
        assert!(matches!(
            MiningStat::from_reading(&litecoin(None, 6.25), reading(None), Utc::now()),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            MiningStat::from_reading(&litecoin(None, 6.25), reading(Some(0.0)), Utc::now()),
            Err(Error::InvalidField { field: "block_time", .. })
        ));
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let stat = MiningStat::from_reading(&litecoin(Some(150.0), 6.25), reading(None), Utc::now()).unwrap();
        let json = serde_json::to_value(&stat).unwrap();
        assert_eq!(json["netHashrate"], 1.9e15);
        assert_eq!(json["blocksPerDay"], 576);
        assert_eq!(json["dailyEmission"], 3600.0);
        assert!(json["lastUpdated"].as_str().unwrap().contains('T'));
    }

    proptest! {
        #[test]
        fn derived_fields_stay_consistent(block_time in 0.5f64..100_000.0, reward in 0.0f64..1_000_000.0) {
            let stat = MiningStat::from_reading(&litecoin(None, reward), reading(Some(block_time)), Utc::now()).unwrap();
            prop_assert_eq!(stat.blocks_per_day, (86400.0 / block_time).floor() as u64);
            prop_assert_eq!(stat.daily_emission, reward * stat.blocks_per_day as f64);
        }
    }
}
