//! Pricing domain module
//!
//! Gold price oracle, pegged token quotes, and conversions.

pub mod convert;
mod model;
mod oracle;

pub use convert::ConversionService;
pub use model::*;
pub use oracle::{
    Clock, CoinGeckoFeed, GoldPriceFeed, PriceOracle, SystemClock, MOCK_GOLD_PRICE_PER_OUNCE,
};
