//! Staking models and data structures
//!
//! The `Stake` row is the audit trail: it is never deleted, its APY is a
//! snapshot copied from the plan at creation time, and its status only
//! moves forward (active -> completed -> claimed; cancelled is reserved).

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Days per year used to derive the simple daily rate from an APY
const DAYS_PER_YEAR: u32 = 365;

/// Stored precision of reward amounts, decimal places
const REWARD_SCALE: u32 = 8;

/// Staking plan read model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct StakingPlan {
    pub id: i32,
    pub name: String,
    pub duration_months: i32,
    pub apy_percent: Decimal,
    pub min_stake: Decimal,
    pub max_stake: Option<Decimal>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StakingPlan {
    /// Check a requested principal against this plan's stake bounds
    pub fn validate_principal(&self, principal: Decimal) -> ApiResult<()> {
        if principal < self.min_stake {
            return Err(ApiError::BelowMinimum(format!(
                "minimum stake for plan '{}' is {} AINT",
                self.name, self.min_stake
            )));
        }

        if let Some(max_stake) = self.max_stake {
            if principal > max_stake {
                return Err(ApiError::AboveMaximum(format!(
                    "maximum stake for plan '{}' is {} AINT",
                    self.name, max_stake
                )));
            }
        }

        Ok(())
    }
}

/// Plan entry as listed to users
#[derive(Debug, Serialize)]
pub struct PlanView {
    pub id: i32,
    pub name: String,
    pub duration_months: i32,
    pub apy_percent: Decimal,
    pub min_stake: Decimal,
    pub max_stake: Option<Decimal>,
    pub description: Option<String>,
    pub popular: bool,
}

/// Stake lifecycle status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "stake_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StakeStatus {
    Active,    // Accruing daily rewards until end_date
    Completed, // Term reached, awaiting claim
    Claimed,   // Principal and rewards paid out (terminal)
    Cancelled, // Reserved, no operation produces it
}

/// A user's staked position
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Stake {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: i32,
    pub principal: Decimal,
    /// APY copied from the plan at creation; later plan edits must not
    /// change what an existing stake earns
    pub apy_percent: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub earned_amount: Decimal,
    pub status: StakeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One day's reward for one stake, append-only
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct RewardEntry {
    pub id: Uuid,
    pub stake_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub reward_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for creating a stake
#[derive(Debug, Deserialize)]
pub struct CreateStakeRequest {
    pub user_id: Uuid,
    pub plan_id: i32,
    pub amount: Decimal,
}

impl CreateStakeRequest {
    /// Validate request
    pub fn validate(&self) -> Result<(), String> {
        if self.amount <= Decimal::ZERO {
            return Err("Amount must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Request DTO for claiming a completed stake
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub user_id: Uuid,
    pub stake_id: Uuid,
}

/// Settlement result returned by a successful claim
#[derive(Debug, Serialize)]
pub struct ClaimResult {
    pub stake_amount: Decimal,
    pub reward_amount: Decimal,
    pub total_amount: Decimal,
}

/// Request DTO for the external accrual trigger
#[derive(Debug, Default, Deserialize)]
pub struct AccrueRequest {
    /// Operator override for back-filling a missed calendar day;
    /// defaults to today
    pub as_of_date: Option<NaiveDate>,
}

/// Batch summary returned by a daily accrual run
#[derive(Debug, Serialize)]
pub struct AccrualSummary {
    pub processed_count: u32,
    pub completed_count: u32,
    pub as_of_date: NaiveDate,
}

/// Stake row joined with its plan, as read from the list query
#[derive(Debug, sqlx::FromRow)]
pub struct StakeWithPlan {
    pub id: Uuid,
    pub principal: Decimal,
    pub apy_percent: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub earned_amount: Decimal,
    pub status: StakeStatus,
    pub plan_name: String,
    pub duration_months: i32,
}

/// Stake entry as listed to users, with computed days remaining
#[derive(Debug, Serialize)]
pub struct StakeView {
    pub id: Uuid,
    pub principal: Decimal,
    pub apy_percent: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub earned_amount: Decimal,
    pub status: StakeStatus,
    pub plan_name: String,
    pub duration_months: i32,
    pub days_remaining: i64,
}

impl StakeView {
    /// Attach the as-of-today days-remaining figure to a joined row
    pub fn from_row(row: StakeWithPlan, today: NaiveDate) -> Self {
        let days_remaining = days_remaining(row.end_date, today);
        Self {
            id: row.id,
            principal: row.principal,
            apy_percent: row.apy_percent,
            start_date: row.start_date,
            end_date: row.end_date,
            earned_amount: row.earned_amount,
            status: row.status,
            plan_name: row.plan_name,
            duration_months: row.duration_months,
            days_remaining,
        }
    }
}

/// Aggregate staking figures for one user
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StakeSummary {
    pub total_staked: Decimal,
    pub total_earned: Decimal,
    pub active_stakes: i64,
}

/// Stakes listing plus the aggregate summary
#[derive(Debug, Serialize)]
pub struct UserStakesResponse {
    pub stakes: Vec<StakeView>,
    pub summary: StakeSummary,
}

/// Balance view combining the available balance with staking aggregates
#[derive(Debug, Serialize)]
pub struct UserBalanceResponse {
    pub available: Decimal,
    pub staked: Decimal,
    pub earned: Decimal,
    pub active_stakes: i64,
}

/// Query parameters carrying the acting user id
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// One day's reward at the snapshot APY: simple daily rate on the
/// principal, no compounding of already-earned rewards
pub fn daily_reward(principal: Decimal, apy_percent: Decimal) -> Decimal {
    (principal * apy_percent / Decimal::from(100) / Decimal::from(DAYS_PER_YEAR))
        .round_dp_with_strategy(REWARD_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Stake end date by calendar-month addition. Day-of-month clamps to the
/// end of shorter months (Jan 31 + 1 month is Feb 28/29).
pub fn stake_end_date(start_date: NaiveDate, duration_months: i32) -> Option<NaiveDate> {
    if duration_months <= 0 {
        return None;
    }
    start_date.checked_add_months(Months::new(duration_months as u32))
}

/// Whole days until the end date, floored at zero
pub fn days_remaining(end_date: NaiveDate, today: NaiveDate) -> i64 {
    (end_date - today).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(min_stake: &str, max_stake: Option<&str>) -> StakingPlan {
        StakingPlan {
            id: 1,
            name: "6 Months".to_string(),
            duration_months: 6,
            apy_percent: "12.00".parse().unwrap(),
            min_stake: min_stake.parse().unwrap(),
            max_stake: max_stake.map(|m| m.parse().unwrap()),
            description: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_principal_at_minimum_succeeds() {
        let plan = plan("500", Some("50000"));
        assert!(plan.validate_principal("500".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_validate_principal_below_minimum_fails() {
        let plan = plan("500", Some("50000"));
        let err = plan
            .validate_principal("499.99999999".parse().unwrap())
            .unwrap_err();
        assert!(matches!(err, ApiError::BelowMinimum(_)));
    }

    #[test]
    fn test_validate_principal_above_maximum_fails() {
        let plan = plan("500", Some("50000"));
        let err = plan
            .validate_principal("50000.00000001".parse().unwrap())
            .unwrap_err();
        assert!(matches!(err, ApiError::AboveMaximum(_)));
    }

    #[test]
    fn test_validate_principal_unbounded_plan_accepts_large_amounts() {
        let plan = plan("500", None);
        assert!(plan.validate_principal("9000000".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_create_stake_request_rejects_non_positive_amounts() {
        let request = CreateStakeRequest {
            user_id: Uuid::new_v4(),
            plan_id: 1,
            amount: Decimal::ZERO,
        };
        assert!(request.validate().is_err());

        let request = CreateStakeRequest {
            user_id: Uuid::new_v4(),
            plan_id: 1,
            amount: "-5".parse().unwrap(),
        };
        assert!(request.validate().is_err());

        let request = CreateStakeRequest {
            user_id: Uuid::new_v4(),
            plan_id: 1,
            amount: "100".parse().unwrap(),
        };
        assert!(request.validate().is_ok());
    }
}
