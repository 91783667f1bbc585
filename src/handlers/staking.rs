//! Staking HTTP handlers
//!
//! Thin over the plan catalog and stake ledger; all business rules live in
//! the service layer and surface here as typed `ApiError`s.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::balance;
use crate::error::ApiError;
use crate::models::ApiResponse;
use crate::staking::{
    AccrualSummary, AccrueRequest, ClaimRequest, ClaimResult, CreateStakeRequest, PlanView, Stake,
    UserBalanceResponse, UserQuery, UserStakesResponse,
};
use crate::state::AppState;

/// GET /api/staking/plans - active plans, shortest duration first
pub async fn list_plans(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PlanView>>>, ApiError> {
    let plans = app_state.plan_catalog.list_active_plans().await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(plans),
        error: None,
    }))
}

/// POST /api/staking/stakes - create a stake
pub async fn create_stake(
    State(app_state): State<AppState>,
    Json(request): Json<CreateStakeRequest>,
) -> Result<Json<ApiResponse<Stake>>, ApiError> {
    if let Err(e) = request.validate() {
        return Err(ApiError::InvalidAmount(e));
    }

    let stake = app_state
        .stake_ledger
        .create_stake(request.user_id, request.plan_id, request.amount)
        .await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(stake),
        error: None,
    }))
}

/// GET /api/staking/stakes - a user's stakes with the aggregate summary
pub async fn list_user_stakes(
    State(app_state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<UserStakesResponse>>, ApiError> {
    let response = app_state.stake_ledger.list_user_stakes(query.user_id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(response),
        error: None,
    }))
}

/// GET /api/staking/stakes/:id - a single stake scoped to its owner
pub async fn get_stake(
    State(app_state): State<AppState>,
    Path(stake_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<Stake>>, ApiError> {
    match app_state
        .stake_ledger
        .get_stake(query.user_id, stake_id)
        .await?
    {
        Some(stake) => Ok(Json(ApiResponse {
            success: true,
            data: Some(stake),
            error: None,
        })),
        None => Err(ApiError::NotFound(format!("Stake {} not found", stake_id))),
    }
}

/// POST /api/staking/claim - settle a completed stake
pub async fn claim_rewards(
    State(app_state): State<AppState>,
    Json(request): Json<ClaimRequest>,
) -> Result<Json<ApiResponse<ClaimResult>>, ApiError> {
    let result = app_state
        .stake_ledger
        .claim_rewards(request.user_id, request.stake_id)
        .await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(result),
        error: None,
    }))
}

/// GET /api/staking/balance - available balance plus staking aggregates
pub async fn get_user_balance(
    State(app_state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<UserBalanceResponse>>, ApiError> {
    let available = balance::get_available(&app_state.db_pool, query.user_id).await?;
    let summary = app_state.stake_ledger.user_summary(query.user_id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(UserBalanceResponse {
            available,
            staked: summary.total_staked,
            earned: summary.total_earned,
            active_stakes: summary.active_stakes,
        }),
        error: None,
    }))
}

/// POST /api/staking/accrue - external cron trigger for the daily accrual.
/// Idempotent per date; an optional as_of_date lets operators replay a
/// missed calendar day.
pub async fn run_accrual(
    State(app_state): State<AppState>,
    request: Option<Json<AccrueRequest>>,
) -> Result<Json<ApiResponse<AccrualSummary>>, ApiError> {
    let as_of_date = request
        .and_then(|Json(r)| r.as_of_date)
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let summary = app_state.stake_ledger.accrue_daily(as_of_date).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(summary),
        error: None,
    }))
}
