pub mod blockchain_info;
pub mod blockchair;

use std::sync::Arc;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use crate::config::coins::{CoinRegistry, SourceKind};
use crate::error::{Error, Result};
use crate::mining_infra::fetch::HttpFetcher;
use crate::types::stat::MiningStat;

pub use blockchain_info::BlockchainInfoAdapter;
pub use blockchair::BlockchairAdapter;

/// One upstream source mapped onto [`MiningStat`].
#[async_trait]
pub trait StatsAdapter: Send + Sync {
    fn source_id(&self) -> &str;
    async fn fetch_stats(&self) -> Result<MiningStat>;
}

/// Adapters for every configured coin, in registry order.
pub fn build_adapters(registry: &CoinRegistry, fetcher: HttpFetcher) -> Vec<Arc<dyn StatsAdapter>> {
    registry
        .iter()
        .map(|coin| -> Arc<dyn StatsAdapter> {
            match coin.source {
                SourceKind::BlockchainInfo { .. } => {
                    Arc::new(BlockchainInfoAdapter::new(coin.clone(), fetcher.clone()))
                }
                SourceKind::Blockchair { .. } => {
                    Arc::new(BlockchairAdapter::new(coin.clone(), fetcher.clone()))
                }
            }
        })
        .collect()
}

/// GET `url`, reject non-success statuses, decode the body as `T`.
pub(crate) async fn fetch_payload<T: DeserializeOwned>(
    fetcher: &HttpFetcher,
    source_id: &str,
    url: &str,
) -> Result<T> {
    let response = fetcher.fetch_with_timeout(url).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::UpstreamStatus {
            source_id: source_id.to_string(),
            status: status.as_u16(),
        });
    }

    let body = fetcher.read_body(url, response).await?;
    serde_json::from_slice(&body).map_err(|e| Error::MalformedPayload {
        source_id: source_id.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn require_non_negative(source_id: &str, field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidField {
            source_id: source_id.to_string(),
            field,
            value,
        })
    }
}

/// Some upstreams encode large numbers as JSON strings.
pub(crate) fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got {:?}", text))),
    }
}
