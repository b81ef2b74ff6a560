use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use crate::config::coins::CoinConfig;
use crate::error::Result;
use crate::mining_infra::adapters::{fetch_payload, number_or_string, require_non_negative, StatsAdapter};
use crate::mining_infra::fetch::HttpFetcher;
use crate::types::hashrate::Hashrate;
use crate::types::stat::{MiningStat, SourceReading};

/// Reads `data.market_price_usd`, `data.hashrate_24h` (H/s) and
/// `data.difficulty`. Block time comes from the coin configuration.
pub struct BlockchairAdapter {
    coin: CoinConfig,
    fetcher: HttpFetcher,
}

impl BlockchairAdapter {
    pub fn new(coin: CoinConfig, fetcher: HttpFetcher) -> Self {
        BlockchairAdapter { coin, fetcher }
    }

    fn to_reading(&self, stats: BlockchairStats) -> Result<SourceReading> {
        let source_id = self.coin.id.as_str();
        let hashrate = require_non_negative(source_id, "hashrate_24h", stats.hashrate_24h)?;

        Ok(SourceReading {
            price_usd: require_non_negative(source_id, "market_price_usd", stats.market_price_usd)?,
            net_hashrate: Hashrate::from_hs(hashrate)?,
            difficulty: require_non_negative(source_id, "difficulty", stats.difficulty)?,
            block_time_secs: None,
        })
    }
}

#[async_trait]
impl StatsAdapter for BlockchairAdapter {
    async fn fetch_stats(&self) -> Result<MiningStat> {
        let envelope: BlockchairEnvelope =
            fetch_payload(&self.fetcher, self.source_id(), self.coin.source.url()).await?;
        let reading = self.to_reading(envelope.data)?;
        MiningStat::from_reading(&self.coin, reading, Utc::now())
    }

    fn source_id(&self) -> &str {
        self.coin.id.as_str()
    }
}

#[derive(Deserialize)]
struct BlockchairEnvelope {
    data: BlockchairStats,
}

#[derive(Deserialize)]
struct BlockchairStats {
    market_price_usd: f64,
    #[serde(alias = "hashrate", deserialize_with = "number_or_string")]
    hashrate_24h: f64,
    difficulty: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::coins::SourceKind;
    use crate::config::FetchConfig;
    use crate::error::Error;
    use crate::types::ids::CoinId;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> BlockchairAdapter {
        let coin = CoinConfig {
            id: CoinId::new("litecoin"),
            name: "Litecoin".to_string(),
            symbol: "LTC".to_string(),
            algorithm: "Scrypt".to_string(),
            block_reward: 6.25,
            block_time_secs: Some(150.0),
            source: SourceKind::Blockchair { url: format!("{}/litecoin/stats", server.uri()) },
            pools: vec![],
        };
        let fetcher = HttpFetcher::new(&FetchConfig { timeout_ms: 500, ..FetchConfig::default() }).unwrap();
        BlockchairAdapter::new(coin, fetcher)
    }

    async fn respond_with(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/litecoin/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn maps_nested_payload_with_string_hashrate() {
        let server = MockServer::start().await;
        respond_with(&server, json!({
            "data": {
                "blocks": 2780000,
                "market_price_usd": 84.12,
                "hashrate_24h": "1893461276453982",
                "difficulty": 36500000.5
            },
            "context": { "code": 200 }
        })).await;

        let stat = adapter(&server).fetch_stats().await.unwrap();
        assert_eq!(stat.symbol, "LTC");
        assert_eq!(stat.price, 84.12);
        assert_eq!(stat.net_hashrate.as_hs(), 1893461276453982.0);
        assert_eq!(stat.difficulty, 36500000.5);
        assert_eq!(stat.block_time, 150.0);
        assert_eq!(stat.blocks_per_day, 576);
        assert_eq!(stat.daily_emission, 3600.0);
    }

    #[tokio::test]
    async fn accepts_legacy_hashrate_field() {
        let server = MockServer::start().await;
        respond_with(&server, json!({
            "data": { "market_price_usd": 84.12, "hashrate": 1.9e15, "difficulty": 3.6e7 }
        })).await;

        let stat = adapter(&server).fetch_stats().await.unwrap();
        assert_eq!(stat.net_hashrate.as_hs(), 1.9e15);
    }

    #[tokio::test]
    async fn missing_data_envelope_fails() {
        let server = MockServer::start().await;
        respond_with(&server, json!({ "market_price_usd": 84.12 })).await;

        match adapter(&server).fetch_stats().await.unwrap_err() {
            Error::MalformedPayload { reason, .. } => assert!(reason.contains("data")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let server = MockServer::start().await;
        respond_with(&server, json!({
            "data": { "market_price_usd": -1.0, "hashrate_24h": "1", "difficulty": 1.0 }
        })).await;

        assert!(matches!(
            adapter(&server).fetch_stats().await,
            Err(Error::InvalidField { field: "market_price_usd", .. })
        ));
    }
}
