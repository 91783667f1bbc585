//! Fiat, token, and gold-weight conversions
//!
//! The arithmetic is pure over a `TokenPriceQuote` so it can be tested
//! without a feed; `ConversionService` is the thin stateful wrapper the
//! convert endpoint uses.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ApiError, ApiResult};

use super::model::{ConvertDirection, ConvertQuery, ConvertResponse, Token, TokenPriceQuote};
use super::oracle::PriceOracle;

/// Convert a USD amount into tokens at the quoted unit price, rounded to
/// 6 decimal places half-up
pub fn fiat_to_token(quote: &TokenPriceQuote, usd_amount: Decimal) -> ApiResult<Decimal> {
    check_amount(usd_amount)?;
    check_price(quote)?;

    Ok((usd_amount / quote.unit_price_usd)
        .round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero))
}

/// Convert a token amount into USD at the quoted unit price, rounded to
/// 2 decimal places half-up
pub fn token_to_fiat(quote: &TokenPriceQuote, token_amount: Decimal) -> ApiResult<Decimal> {
    check_amount(token_amount)?;
    check_price(quote)?;

    Ok((token_amount * quote.unit_price_usd)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Gold weight in grams backing a token amount
pub fn token_to_gold_weight(token: Token, token_amount: Decimal) -> ApiResult<Decimal> {
    check_amount(token_amount)?;

    Ok(token_amount * token.gold_weight_grams())
}

fn check_amount(amount: Decimal) -> ApiResult<()> {
    if amount < Decimal::ZERO {
        return Err(ApiError::InvalidAmount(format!(
            "amount must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}

fn check_price(quote: &TokenPriceQuote) -> ApiResult<()> {
    if quote.unit_price_usd <= Decimal::ZERO {
        return Err(ApiError::PriceUnavailable(format!(
            "degenerate unit price for {}",
            quote.token.symbol()
        )));
    }
    Ok(())
}

/// Conversion service backed by the price oracle
pub struct ConversionService {
    oracle: Arc<PriceOracle>,
}

impl ConversionService {
    /// Create a new conversion service instance
    pub fn new(oracle: Arc<PriceOracle>) -> Self {
        Self { oracle }
    }

    /// Run one conversion against the current quote
    pub async fn convert(&self, query: ConvertQuery) -> ApiResult<ConvertResponse> {
        let quote = self.oracle.get_token_price(query.token).await;

        let result = match query.direction {
            ConvertDirection::FiatToToken => fiat_to_token(&quote, query.amount)?,
            ConvertDirection::TokenToFiat => token_to_fiat(&quote, query.amount)?,
            ConvertDirection::TokenToGoldWeight => token_to_gold_weight(query.token, query.amount)?,
        };

        Ok(ConvertResponse {
            token: query.token,
            direction: query.direction,
            input_amount: query.amount,
            result,
            unit_price_usd: quote.unit_price_usd,
            as_of: quote.as_of,
        })
    }
}
