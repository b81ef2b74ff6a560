use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::types::hashrate::Hashrate;
use crate::types::ids::CoinId;

/// Static per-coin settings the upstream payloads do not carry.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CoinConfig {
    pub id: CoinId,
    pub name: String,
    pub symbol: String,
    pub algorithm: String,
    pub block_reward: f64,
    /// Target block spacing. Used when the source does not report one.
    #[serde(default)]
    pub block_time_secs: Option<f64>,
    pub source: SourceKind,
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceKind {
    /// blockchain.info `/stats`: flat payload, reports block spacing.
    BlockchainInfo { url: String },
    /// blockchair `/<chain>/stats`: payload nested under `data`.
    Blockchair { url: String },
}

impl SourceKind {
    pub fn url(&self) -> &str {
        match self {
            SourceKind::BlockchainInfo { url } | SourceKind::Blockchair { url } => url,
        }
    }

    pub fn reports_block_time(&self) -> bool {
        matches!(self, SourceKind::BlockchainInfo { .. })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PoolConfig {
    pub name: String,
    pub hashrate: Hashrate,
    #[serde(default)]
    pub miners: Option<u64>,
}

/// The one coin table shared by the adapters and the views, in display order.
#[derive(Clone, Debug)]
pub struct CoinRegistry {
    coins: Vec<CoinConfig>,
}

impl CoinRegistry {
    pub fn new(coins: Vec<CoinConfig>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(coins.len());

        for mut coin in coins {
            if coin.id.as_str().is_empty() {
                return Err(Error::ConfigError("coin id must not be empty".to_string()));
            }
            if !seen.insert(coin.id.clone()) {
                return Err(Error::ConfigError(format!("duplicate coin id: {}", coin.id)));
            }
            if !coin.block_reward.is_finite() || coin.block_reward < 0.0 {
                return Err(Error::ConfigError(format!(
                    "{}: block_reward must be a non-negative number, got {}",
                    coin.id, coin.block_reward
                )));
            }
            match coin.block_time_secs {
                Some(secs) if !secs.is_finite() || secs <= 0.0 => {
                    return Err(Error::ConfigError(format!(
                        "{}: block_time_secs must be positive, got {}",
                        coin.id, secs
                    )));
                }
                None if !coin.source.reports_block_time() => {
                    return Err(Error::ConfigError(format!(
                        "{}: block_time_secs is required for this source",
                        coin.id
                    )));
                }
                _ => {}
            }
            coin.symbol = coin.symbol.trim().to_uppercase();
            validated.push(coin);
        }

        Ok(CoinRegistry { coins: validated })
    }

    pub fn get(&self, id: &CoinId) -> Result<&CoinConfig> {
        self.coins
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| Error::UnknownCoin(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoinConfig> {
        self.coins.iter()
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

pub fn default_coins() -> Vec<CoinConfig> {
    vec![
        CoinConfig {
            id: CoinId::new("bitcoin"),
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            algorithm: "SHA-256".to_string(),
            block_reward: 3.125,
            block_time_secs: Some(600.0),
            source: SourceKind::BlockchainInfo {
                url: "https://api.blockchain.info/stats".to_string(),
            },
            pools: vec![],
        },
        CoinConfig {
            id: CoinId::new("litecoin"),
            name: "Litecoin".to_string(),
            symbol: "LTC".to_string(),
            algorithm: "Scrypt".to_string(),
            block_reward: 6.25,
            block_time_secs: Some(150.0),
            source: SourceKind::Blockchair {
                url: "https://api.blockchair.com/litecoin/stats".to_string(),
            },
            pools: vec![],
        },
        CoinConfig {
            id: CoinId::new("dogecoin"),
            name: "Dogecoin".to_string(),
            symbol: "DOGE".to_string(),
            algorithm: "Scrypt".to_string(),
            block_reward: 10_000.0,
            block_time_secs: Some(60.0),
            source: SourceKind::Blockchair {
                url: "https://api.blockchair.com/dogecoin/stats".to_string(),
            },
            pools: vec![],
        },
        CoinConfig {
            id: CoinId::new("bitcoin-cash"),
            name: "Bitcoin Cash".to_string(),
            symbol: "BCH".to_string(),
            algorithm: "SHA-256".to_string(),
            block_reward: 3.125,
            block_time_secs: Some(600.0),
            source: SourceKind::Blockchair {
                url: "https://api.blockchair.com/bitcoin-cash/stats".to_string(),
            },
            pools: vec![],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        let registry = CoinRegistry::new(default_coins()).unwrap();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get(&CoinId::new("dogecoin")).unwrap().symbol, "DOGE");
        assert!(matches!(
            registry.get(&CoinId::new("verus")),
            Err(Error::UnknownCoin(id)) if id == "verus"
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut coins = default_coins();
        coins.push(coins[0].clone());
        assert!(matches!(CoinRegistry::new(coins), Err(Error::ConfigError(_))));
    }

    #[test]
    fn blockchair_coins_need_a_block_time() {
        let mut coins = default_coins();
        coins[1].block_time_secs = None;
        assert!(CoinRegistry::new(coins).is_err());

        let mut coins = default_coins();
        coins[0].block_time_secs = None;
        assert!(CoinRegistry::new(coins).is_ok());
    }

    #[test]
    fn rejects_negative_reward() {
        let mut coins = default_coins();
        coins[2].block_reward = -1.0;
        assert!(CoinRegistry::new(coins).is_err());
    }

    #[test]
    fn uppercases_symbols() {
        let mut coins = default_coins();
        coins[0].symbol = " btc".to_string();
        let registry = CoinRegistry::new(coins).unwrap();
        assert_eq!(registry.iter().next().unwrap().symbol, "BTC");
    }

    #[test]
    fn deserializes_tagged_source_and_pools() {
        let toml_str = r#"
            id = "verus"
            name = "Verus Coin"
            symbol = "vrsc"
            algorithm = "VerusHash 2.2"
            block_reward = 24
            block_time_secs = 60

            [source]
            type = "blockchair"
            url = "http://localhost:9000/verus/stats"

            [[pools]]
            name = "Luckpool"
            hashrate = "12.4 TH/s"
            miners = 342

            [[pools]]
            name = "HellsPool"
            hashrate = 8.7e12
        "#;
        let coin: CoinConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(coin.source, SourceKind::Blockchair { url: "http://localhost:9000/verus/stats".to_string() });
        assert_eq!(coin.pools.len(), 2);
        assert_eq!(coin.pools[0].miners, Some(342));
        assert_eq!(coin.pools[1].miners, None);
        assert!(coin.pools[0].hashrate > coin.pools[1].hashrate);
    }
}
