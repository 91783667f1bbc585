//! Stake ledger - lifecycle of staked positions
//!
//! Sole writer of `user_stakes` and `staking_rewards`. Creation debits the
//! user's balance in the same transaction as the stake insert; the daily
//! accrual pass appends one reward row per stake per calendar day; claim
//! settlement pays principal plus rewards back to the balance and closes
//! the position.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::balance;
use crate::error::{ApiError, ApiResult};

use super::model::{
    daily_reward, stake_end_date, AccrualSummary, ClaimResult, Stake, StakeStatus, StakeSummary,
    StakeView, StakeWithPlan, StakingPlan, UserStakesResponse,
};

/// Outcome of one stake's accrual attempt for one date
enum AccrualOutcome {
    /// Reward appended; `completed` marks the active -> completed transition
    Accrued { completed: bool },
    /// A reward row for this (stake, date) already exists
    AlreadyAccrued,
}

/// Stake ledger service
pub struct StakeLedger {
    db_pool: PgPool,
}

impl StakeLedger {
    /// Create a new stake ledger instance
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a stake against an active plan, debiting the user's balance
    /// atomically with the stake insert.
    pub async fn create_stake(
        &self,
        user_id: Uuid,
        plan_id: i32,
        principal: Decimal,
    ) -> ApiResult<Stake> {
        if principal <= Decimal::ZERO {
            return Err(ApiError::InvalidAmount(
                "stake amount must be greater than 0".to_string(),
            ));
        }

        let mut tx = self.db_pool.begin().await?;

        // Plan read inside the transaction; the APY snapshot below is what
        // insulates the stake from later plan edits.
        let plan: Option<StakingPlan> =
            sqlx::query_as("SELECT * FROM staking_plans WHERE id = $1 AND is_active = TRUE")
                .bind(plan_id)
                .fetch_optional(&mut *tx)
                .await?;

        let plan = plan.ok_or_else(|| {
            ApiError::InvalidPlan(format!("plan {} does not exist or is not active", plan_id))
        })?;

        plan.validate_principal(principal)?;

        let start_date = Utc::now().date_naive();
        let end_date = stake_end_date(start_date, plan.duration_months).ok_or_else(|| {
            ApiError::InternalError(format!(
                "could not compute end date for plan {}",
                plan.id
            ))
        })?;

        // Lock order is stake row before balance row, here and in claim.
        let stake: Stake = sqlx::query_as(
            r#"
            INSERT INTO user_stakes (
                id, user_id, plan_id, principal, apy_percent,
                start_date, end_date, earned_amount, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 'active', NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(plan_id)
        .bind(principal)
        .bind(plan.apy_percent)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&mut *tx)
        .await?;

        balance::debit(&mut tx, user_id, principal).await?;

        tx.commit().await?;

        tracing::info!(
            stake_id = %stake.id,
            user_id = %user_id,
            plan_id = plan_id,
            principal = %principal,
            apy_percent = %stake.apy_percent,
            end_date = %end_date,
            "Stake created"
        );

        Ok(stake)
    }

    /// Accrue one day's reward for every eligible stake.
    ///
    /// Safe to invoke more than once per date: the unique
    /// (stake_id, reward_date) constraint makes the reward insert a no-op
    /// on repeat runs. An error on one stake is logged and skipped so a
    /// bad record cannot block the cohort; since no reward row was written
    /// for it, the next run retries it.
    pub async fn accrue_daily(&self, as_of_date: NaiveDate) -> ApiResult<AccrualSummary> {
        let stakes: Vec<Stake> = sqlx::query_as(
            r#"
            SELECT * FROM user_stakes
            WHERE status = 'active' AND start_date <= $1 AND end_date >= $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(as_of_date)
        .fetch_all(&self.db_pool)
        .await?;

        let eligible = stakes.len();
        let mut processed_count = 0u32;
        let mut completed_count = 0u32;

        for stake in stakes {
            match self.accrue_one(&stake, as_of_date).await {
                Ok(AccrualOutcome::Accrued { completed }) => {
                    processed_count += 1;
                    if completed {
                        completed_count += 1;
                    }
                }
                Ok(AccrualOutcome::AlreadyAccrued) => {}
                Err(e) => {
                    tracing::error!(
                        stake_id = %stake.id,
                        as_of_date = %as_of_date,
                        error = %e,
                        "Skipping stake after accrual failure, will retry next run"
                    );
                }
            }
        }

        tracing::info!(
            as_of_date = %as_of_date,
            eligible = eligible,
            processed = processed_count,
            completed = completed_count,
            "Daily reward accrual finished"
        );

        Ok(AccrualSummary {
            processed_count,
            completed_count,
            as_of_date,
        })
    }

    /// One stake's reward append, earned-amount increment, and (when the
    /// term is over) completion transition, in a single transaction.
    async fn accrue_one(&self, stake: &Stake, as_of_date: NaiveDate) -> ApiResult<AccrualOutcome> {
        let reward = daily_reward(stake.principal, stake.apy_percent);

        let mut tx = self.db_pool.begin().await?;

        // Atomic test-and-set: the unique (stake_id, reward_date) key
        // turns a duplicate run into zero affected rows.
        let inserted = sqlx::query(
            r#"
            INSERT INTO staking_rewards (id, stake_id, user_id, amount, reward_date, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (stake_id, reward_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(stake.id)
        .bind(stake.user_id)
        .bind(reward)
        .bind(as_of_date)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(AccrualOutcome::AlreadyAccrued);
        }

        sqlx::query(
            r#"
            UPDATE user_stakes
            SET earned_amount = earned_amount + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(stake.id)
        .bind(reward)
        .execute(&mut *tx)
        .await?;

        let mut completed = false;
        if as_of_date >= stake.end_date {
            // Guarded transition, a no-op on anything already past Active
            let result = sqlx::query(
                r#"
                UPDATE user_stakes
                SET status = 'completed', updated_at = NOW()
                WHERE id = $1 AND status = 'active'
                "#,
            )
            .bind(stake.id)
            .execute(&mut *tx)
            .await?;

            completed = result.rows_affected() > 0;
        }

        tx.commit().await?;

        Ok(AccrualOutcome::Accrued { completed })
    }

    /// Settle a completed stake: pay principal plus rewards back to the
    /// user's balance and close the position.
    pub async fn claim_rewards(&self, user_id: Uuid, stake_id: Uuid) -> ApiResult<ClaimResult> {
        let mut tx = self.db_pool.begin().await?;

        // Row lock so concurrent claims serialize on the stake
        let stake: Option<Stake> = sqlx::query_as(
            "SELECT * FROM user_stakes WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(stake_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let stake = stake.ok_or_else(|| {
            ApiError::NotEligible("stake not found or not eligible for claiming".to_string())
        })?;

        if stake.status != StakeStatus::Completed {
            return Err(ApiError::NotEligible(
                "stake not found or not eligible for claiming".to_string(),
            ));
        }

        if stake.earned_amount <= Decimal::ZERO {
            return Err(ApiError::NotEligible("no rewards to claim".to_string()));
        }

        let total_amount = stake.principal + stake.earned_amount;

        sqlx::query(
            r#"
            UPDATE user_stakes
            SET status = 'claimed', earned_amount = 0, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(stake.id)
        .execute(&mut *tx)
        .await?;

        balance::credit(&mut tx, user_id, total_amount).await?;

        tx.commit().await?;

        tracing::info!(
            stake_id = %stake.id,
            user_id = %user_id,
            principal = %stake.principal,
            reward = %stake.earned_amount,
            total = %total_amount,
            "Stake claimed"
        );

        Ok(ClaimResult {
            stake_amount: stake.principal,
            reward_amount: stake.earned_amount,
            total_amount,
        })
    }

    /// List a user's stakes, newest first, with plan details and days
    /// remaining, plus the aggregate summary.
    pub async fn list_user_stakes(&self, user_id: Uuid) -> ApiResult<UserStakesResponse> {
        let rows: Vec<StakeWithPlan> = sqlx::query_as(
            r#"
            SELECT
                us.id,
                us.principal,
                us.apy_percent,
                us.start_date,
                us.end_date,
                us.earned_amount,
                us.status,
                sp.name AS plan_name,
                sp.duration_months
            FROM user_stakes us
            JOIN staking_plans sp ON us.plan_id = sp.id
            WHERE us.user_id = $1
            ORDER BY us.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        let today = Utc::now().date_naive();
        let stakes: Vec<StakeView> = rows
            .into_iter()
            .map(|row| StakeView::from_row(row, today))
            .collect();

        let summary = self.user_summary(user_id).await?;

        Ok(UserStakesResponse { stakes, summary })
    }

    /// Aggregate staked/earned/active figures for one user
    pub async fn user_summary(&self, user_id: Uuid) -> ApiResult<StakeSummary> {
        let summary: StakeSummary = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'active' THEN principal ELSE 0 END), 0) AS total_staked,
                COALESCE(SUM(earned_amount), 0) AS total_earned,
                COUNT(CASE WHEN status = 'active' THEN 1 END) AS active_stakes
            FROM user_stakes
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(summary)
    }

    /// Get a single stake scoped to its owner
    pub async fn get_stake(&self, user_id: Uuid, stake_id: Uuid) -> ApiResult<Option<Stake>> {
        let stake = sqlx::query_as("SELECT * FROM user_stakes WHERE id = $1 AND user_id = $2")
            .bind(stake_id)
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(stake)
    }
}
