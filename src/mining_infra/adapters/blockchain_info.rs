use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use crate::config::coins::CoinConfig;
use crate::error::Result;
use crate::mining_infra::adapters::{fetch_payload, require_non_negative, StatsAdapter};
use crate::mining_infra::fetch::HttpFetcher;
use crate::types::hashrate::Hashrate;
use crate::types::stat::{MiningStat, SourceReading};

/// blockchain.info reports `hash_rate` in GH/s.
const HASH_RATE_SCALE: f64 = 1e9;

pub struct BlockchainInfoAdapter {
    coin: CoinConfig,
    fetcher: HttpFetcher,
}

impl BlockchainInfoAdapter {
    pub fn new(coin: CoinConfig, fetcher: HttpFetcher) -> Self {
        BlockchainInfoAdapter { coin, fetcher }
    }

    fn to_reading(&self, stats: BlockchainInfoStats) -> Result<SourceReading> {
        let source_id = self.coin.id.as_str();
        let hash_rate = require_non_negative(source_id, "hash_rate", stats.hash_rate * HASH_RATE_SCALE)?;
        let minutes = require_non_negative(source_id, "minutes_between_blocks", stats.minutes_between_blocks)?;

        Ok(SourceReading {
            price_usd: require_non_negative(source_id, "market_price_usd", stats.market_price_usd)?,
            net_hashrate: Hashrate::from_hs(hash_rate)?,
            difficulty: require_non_negative(source_id, "difficulty", stats.difficulty)?,
            block_time_secs: Some(minutes * 60.0),
        })
    }
}

#[async_trait]
impl StatsAdapter for BlockchainInfoAdapter {
    async fn fetch_stats(&self) -> Result<MiningStat> {
        let stats: BlockchainInfoStats =
            fetch_payload(&self.fetcher, self.source_id(), self.coin.source.url()).await?;
        let reading = self.to_reading(stats)?;
        MiningStat::from_reading(&self.coin, reading, Utc::now())
    }

    fn source_id(&self) -> &str {
        self.coin.id.as_str()
    }
}

#[derive(Deserialize)]
struct BlockchainInfoStats {
    market_price_usd: f64,
    hash_rate: f64,
    difficulty: f64,
    minutes_between_blocks: f64,
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

    fn adapter(server: &MockServer) -> BlockchainInfoAdapter {
        let coin = CoinConfig {
            id: CoinId::new("bitcoin"),
            name: "Bitcoin".to_string(),
            symbol: "btc".to_string(),
            algorithm: "SHA-256".to_string(),
            block_reward: 3.125,
            block_time_secs: Some(600.0),
            source: SourceKind::BlockchainInfo { url: format!("{}/stats", server.uri()) },
            pools: vec![],
        };
        let fetcher = HttpFetcher::new(&FetchConfig { timeout_ms: 500, ..FetchConfig::default() }).unwrap();
        BlockchainInfoAdapter::new(coin, fetcher)
    }

    async fn respond_with(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn maps_flat_payload() {
        let server = MockServer::start().await;
        respond_with(&server, ResponseTemplate::new(200).set_body_json(json!({
            "market_price_usd": 67012.5,
            "hash_rate": 6.4e11,
            "difficulty": 8.8e13,
            "minutes_between_blocks": 9.5,
            "n_blocks_mined": 151
        }))).await;

        let before = Utc::now();
        let stat = adapter(&server).fetch_stats().await.unwrap();

        assert_eq!(stat.coin, "Bitcoin");
        assert_eq!(stat.symbol, "BTC");
        assert_eq!(stat.algorithm, "SHA-256");
        assert_eq!(stat.price, 67012.5);
        assert_eq!(stat.net_hashrate.as_hs(), 6.4e20);
        assert_eq!(stat.difficulty, 8.8e13);
        assert_eq!(stat.block_time, 570.0);
        assert_eq!(stat.blocks_per_day, 151);
        assert_eq!(stat.daily_emission, 3.125 * 151.0);
        assert!(stat.last_updated >= before);
    }

    #[tokio::test]
    async fn missing_field_fails_instead_of_defaulting() {
        let server = MockServer::start().await;
        respond_with(&server, ResponseTemplate::new(200).set_body_json(json!({
            "market_price_usd": 67012.5,
            "difficulty": 8.8e13,
            "minutes_between_blocks": 9.5
        }))).await;

        match adapter(&server).fetch_stats().await.unwrap_err() {
            Error::MalformedPayload { source_id, reason } => {
                assert_eq!(source_id, "bitcoin");
                assert!(reason.contains("hash_rate"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn null_field_fails() {
        let server = MockServer::start().await;
        respond_with(&server, ResponseTemplate::new(200).set_body_json(json!({
            "market_price_usd": null,
            "hash_rate": 6.4e11,
            "difficulty": 8.8e13,
            "minutes_between_blocks": 9.5
        }))).await;

        assert!(matches!(
            adapter(&server).fetch_stats().await,
            Err(Error::MalformedPayload { .. })
        ));
    }

    #[tokio::test]
    async fn zero_block_spacing_is_rejected() {
        let server = MockServer::start().await;
        respond_with(&server, ResponseTemplate::new(200).set_body_json(json!({
            "market_price_usd": 67012.5,
            "hash_rate": 6.4e11,
            "difficulty": 8.8e13,
            "minutes_between_blocks": 0
        }))).await;

        assert!(matches!(
            adapter(&server).fetch_stats().await,
            Err(Error::InvalidField { field: "block_time", .. })
        ));
    }

    #[tokio::test]
    async fn hash_rate_overflowing_after_scaling_is_an_invalid_field() {
        let server = MockServer::start().await;
        respond_with(&server, ResponseTemplate::new(200).set_body_json(json!({
            "market_price_usd": 67012.5,
            "hash_rate": 1e300,
            "difficulty": 8.8e13,
            "minutes_between_blocks": 9.5
        }))).await;

        let err = adapter(&server).fetch_stats().await.unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: "hash_rate", .. }));
        assert!(err.is_source_failure());
    }

    #[tokio::test]
    async fn http_error_carries_status() {
        let server = MockServer::start().await;
        respond_with(&server, ResponseTemplate::new(429)).await;

        let err = adapter(&server).fetch_stats().await.unwrap_err();
        assert_eq!(err.status_code(), Some(429));
    }
}
