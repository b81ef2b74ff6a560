use serde::{Deserialize, Serialize};
use std::fmt;

/// Route-level identifier of a coin (`bitcoin`, `bitcoin-cash`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CoinId(String);

impl CoinId {
    pub fn new(id: impl Into<String>) -> Self {
        CoinId(id.into().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CoinId {
    fn from(id: String) -> Self {
        CoinId::new(id)
    }
}

impl From<CoinId> for String {
    fn from(id: CoinId) -> Self {
        id.0
    }
}

impl From<&str> for CoinId {
    fn from(id: &str) -> Self {
        CoinId::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(CoinId::new(" Bitcoin-Cash "), CoinId::from("bitcoin-cash"));
        assert_eq!(CoinId::new("LTC").as_str(), "ltc");
    }
}
