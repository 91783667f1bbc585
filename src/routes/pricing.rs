//! Pricing route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn pricing_routes() -> Router<AppState> {
    Router::new()
        .route("/api/price/gold", get(get_gold_price))
        .route("/api/price/tokens", get(get_token_prices))
        .route("/api/price/refresh", post(refresh_gold_price))
        .route("/api/price/convert", get(convert))
}
