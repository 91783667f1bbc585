//! Pricing models and data structures
//!
//! Both platform tokens are pegged to a fixed weight of gold, so every
//! price here derives from a single gold-price sample.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Grams per troy ounce, the conversion the gold feed quotes in
pub const GRAMS_PER_TROY_OUNCE: Decimal = Decimal::from_parts(311035, 0, 0, false, 4);

/// Gold weight backing one AINT, in grams
pub const AINT_WEIGHT_IN_GRAMS: Decimal = Decimal::from_parts(425, 0, 0, false, 2);

/// Gold weight backing one GAG, in grams (same peg as AINT)
pub const GAG_WEIGHT_IN_GRAMS: Decimal = Decimal::from_parts(425, 0, 0, false, 2);

/// The two gold-pegged platform tokens
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Token {
    Aint,
    Gag,
}

impl Token {
    /// Fixed gold weight backing one unit of this token
    pub fn gold_weight_grams(&self) -> Decimal {
        match self {
            Token::Aint => AINT_WEIGHT_IN_GRAMS,
            Token::Gag => GAG_WEIGHT_IN_GRAMS,
        }
    }

    /// Ticker symbol for display and logging
    pub fn symbol(&self) -> &'static str {
        match self {
            Token::Aint => "AINT",
            Token::Gag => "GAG",
        }
    }
}

/// Where a gold price sample came from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// Fetched from the external feed
    Live,
    /// Fixed mock data used when the feed is unreachable
    Fallback,
}

/// A gold price observation, cached in process memory only
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GoldPriceSample {
    /// USD per gram of gold, rounded to cents
    pub price_per_gram: Decimal,
    /// USD per troy ounce of gold, rounded to cents
    pub price_per_ounce: Decimal,
    pub fetched_at: DateTime<Utc>,
    pub source: PriceSource,
}

/// A derived token price, recomputed from the current gold sample
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenPriceQuote {
    pub token: Token,
    /// USD per token: gold price per gram times the token's gold weight
    pub unit_price_usd: Decimal,
    pub gold_price_per_gram: Decimal,
    pub gold_weight_grams: Decimal,
    pub as_of: DateTime<Utc>,
    pub source: PriceSource,
}

/// Combined display payload for the price screens
#[derive(Debug, Serialize)]
pub struct TokenPricesResponse {
    pub aint: TokenPriceQuote,
    pub gag: TokenPriceQuote,
    pub gold_price_per_gram: Decimal,
    pub as_of: DateTime<Utc>,
    pub source: PriceSource,
}

/// Conversion direction for the convert endpoint
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConvertDirection {
    FiatToToken,
    TokenToFiat,
    TokenToGoldWeight,
}

/// Query parameters for the convert endpoint
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub token: Token,
    pub direction: ConvertDirection,
    pub amount: Decimal,
}

/// Result of a conversion
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub token: Token,
    pub direction: ConvertDirection,
    pub input_amount: Decimal,
    pub result: Decimal,
    pub unit_price_usd: Decimal,
    pub as_of: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_gold_weights_match_peg() {
        let expected: Decimal = "4.25".parse().unwrap();
        assert_eq!(Token::Aint.gold_weight_grams(), expected);
        assert_eq!(Token::Gag.gold_weight_grams(), expected);
    }

    #[test]
    fn test_grams_per_troy_ounce() {
        let expected: Decimal = "31.1035".parse().unwrap();
        assert_eq!(GRAMS_PER_TROY_OUNCE, expected);
    }

    #[test]
    fn test_token_symbols() {
        assert_eq!(Token::Aint.symbol(), "AINT");
        assert_eq!(Token::Gag.symbol(), "GAG");
    }
}
