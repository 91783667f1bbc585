//! Staking route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn staking_routes() -> Router<AppState> {
    Router::new()
        .route("/api/staking/plans", get(list_plans))
        .route("/api/staking/stakes", post(create_stake))
        .route("/api/staking/stakes", get(list_user_stakes))
        .route("/api/staking/stakes/:id", get(get_stake))
        .route("/api/staking/claim", post(claim_rewards))
        .route("/api/staking/balance", get(get_user_balance))
        .route("/api/staking/accrue", post(run_accrual))
}
