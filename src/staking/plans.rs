//! Staking plan catalog
//!
//! Read-only view of the configured plans. Plan authoring is an admin
//! concern outside this service; the ledger only reads plans and copies
//! their APY into a stake at creation time.

use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};

use super::model::{PlanView, StakingPlan};

/// The plan duration highlighted as recommended in the UI
const POPULAR_DURATION_MONTHS: i32 = 6;

/// Catalog of available staking plans
pub struct PlanCatalog {
    db_pool: PgPool,
}

impl PlanCatalog {
    /// Create a new plan catalog instance
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// List active plans, shortest duration first
    pub async fn list_active_plans(&self) -> ApiResult<Vec<PlanView>> {
        let plans: Vec<StakingPlan> = sqlx::query_as(
            r#"
            SELECT * FROM staking_plans
            WHERE is_active = TRUE
            ORDER BY duration_months ASC
            "#,
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(plans
            .into_iter()
            .map(|plan| PlanView {
                id: plan.id,
                name: plan.name,
                duration_months: plan.duration_months,
                apy_percent: plan.apy_percent,
                min_stake: plan.min_stake,
                max_stake: plan.max_stake,
                description: plan.description,
                popular: plan.duration_months == POPULAR_DURATION_MONTHS,
            })
            .collect())
    }

    /// Get a single plan by id
    pub async fn get_plan(&self, id: i32) -> ApiResult<StakingPlan> {
        let plan: Option<StakingPlan> =
            sqlx::query_as("SELECT * FROM staking_plans WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await?;

        plan.ok_or_else(|| ApiError::NotFound(format!("Staking plan {} not found", id)))
    }
}
