//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::pricing::{ConversionService, PriceOracle};
use crate::staking::{PlanCatalog, StakeLedger};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub price_oracle: Arc<PriceOracle>,
    pub conversion_service: Arc<ConversionService>,
    pub plan_catalog: Arc<PlanCatalog>,
    pub stake_ledger: Arc<StakeLedger>,
}

impl AppState {
    pub fn new(
        db_pool: PgPool,
        price_oracle: Arc<PriceOracle>,
        conversion_service: Arc<ConversionService>,
        plan_catalog: Arc<PlanCatalog>,
        stake_ledger: Arc<StakeLedger>,
    ) -> Self {
        Self {
            db_pool,
            price_oracle,
            conversion_service,
            plan_catalog,
            stake_ledger,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for Arc<PriceOracle> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.price_oracle.clone()
    }
}

impl FromRef<AppState> for Arc<ConversionService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.conversion_service.clone()
    }
}

impl FromRef<AppState> for Arc<PlanCatalog> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.plan_catalog.clone()
    }
}

impl FromRef<AppState> for Arc<StakeLedger> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.stake_ledger.clone()
    }
}
