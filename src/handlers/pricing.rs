//! Pricing HTTP handlers
//!
//! Price reads never fail on feed trouble (the oracle falls back to mock
//! data), so these handlers only surface conversion errors.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::ApiError;
use crate::models::ApiResponse;
use crate::pricing::{
    ConvertQuery, ConvertResponse, GoldPriceSample, PriceOracle, Token, TokenPricesResponse,
};
use crate::state::AppState;

/// GET /api/price/gold - current gold price sample
pub async fn get_gold_price(
    State(app_state): State<AppState>,
) -> Json<ApiResponse<GoldPriceSample>> {
    let sample = app_state.price_oracle.get_gold_price().await;

    Json(ApiResponse {
        success: true,
        data: Some(sample),
        error: None,
    })
}

/// GET /api/price/tokens - both pegged token quotes
pub async fn get_token_prices(
    State(app_state): State<AppState>,
) -> Json<ApiResponse<TokenPricesResponse>> {
    let sample = app_state.price_oracle.get_gold_price().await;
    let aint = PriceOracle::quote_from_sample(&sample, Token::Aint);
    let gag = PriceOracle::quote_from_sample(&sample, Token::Gag);

    Json(ApiResponse {
        success: true,
        data: Some(TokenPricesResponse {
            aint,
            gag,
            gold_price_per_gram: sample.price_per_gram,
            as_of: sample.fetched_at,
            source: sample.source,
        }),
        error: None,
    })
}

/// POST /api/price/refresh - invalidate the cache and refetch now
pub async fn refresh_gold_price(
    State(app_state): State<AppState>,
) -> Json<ApiResponse<GoldPriceSample>> {
    let sample = app_state.price_oracle.force_refresh().await;

    Json(ApiResponse {
        success: true,
        data: Some(sample),
        error: None,
    })
}

/// GET /api/price/convert - fiat/token/gold-weight conversion
pub async fn convert(
    State(app_state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ApiResponse<ConvertResponse>>, ApiError> {
    let response = app_state.conversion_service.convert(query).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(response),
        error: None,
    }))
}
