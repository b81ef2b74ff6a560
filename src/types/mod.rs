pub mod hashrate;
pub mod ids;
pub mod stat;

pub use hashrate::Hashrate;
pub use ids::CoinId;
pub use stat::{MiningStat, SourceReading};
