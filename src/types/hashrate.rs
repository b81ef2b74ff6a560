use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::analytics::formatting::format_hashrate;
use crate::error::Error;

/// Display units in ascending order, each 1000x the previous one.
pub const HASHRATE_UNITS: [&str; 7] = ["H/s", "KH/s", "MH/s", "GH/s", "TH/s", "PH/s", "EH/s"];

/// Hashrate normalized to hashes per second.
///
/// Everything that computes with hashrates goes through this type, so values
/// are only scaled to a unit string when they are displayed. Parsing a
/// unit-suffixed string (`"12.4 TH/s"`) scales it back to H/s by its unit.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "HashrateRepr")]
pub struct Hashrate(f64);

impl Hashrate {
    pub fn from_hs(hashes_per_second: f64) -> Result<Self, Error> {
        if !hashes_per_second.is_finite() || hashes_per_second < 0.0 {
            return Err(Error::InvalidHashrate(hashes_per_second.to_string()));
        }
        Ok(Hashrate(hashes_per_second))
    }

    pub fn zero() -> Self {
        Hashrate(0.0)
    }

    pub fn as_hs(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl FromStr for Hashrate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);

        let value: f64 = number
            .trim()
            .replace(',', "")
            .parse()
            .map_err(|_| Error::InvalidHashrate(s.to_string()))?;

        let unit = unit.trim();
        let exponent = if unit.is_empty() {
            0
        } else {
            HASHRATE_UNITS
                .iter()
                .position(|u| u.eq_ignore_ascii_case(unit))
                .ok_or_else(|| Error::InvalidHashrate(s.to_string()))?
        };

        Hashrate::from_hs(value * 1000f64.powi(exponent as i32))
            .map_err(|_| Error::InvalidHashrate(s.to_string()))
    }
}

impl fmt::Display for Hashrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_hashrate(self.0))
    }
}

impl From<Hashrate> for f64 {
    fn from(hashrate: Hashrate) -> Self {
        hashrate.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HashrateRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<HashrateRepr> for Hashrate {
    type Error = Error;

    fn try_from(repr: HashrateRepr) -> Result<Self, Self::Error> {
        match repr {
            HashrateRepr::Number(value) => Hashrate::from_hs(value),
            HashrateRepr::Text(text) => text.parse(),
        }
    }
}
