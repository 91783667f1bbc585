//! Available-balance ledger
//!
//! Minimal contract over the `user_balances` table. `debit` and `credit`
//! are transaction-scoped so stake creation and claim settlement can move
//! funds atomically with their own row changes.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Get a user's available balance, zero if no row exists yet
pub async fn get_available(pool: &PgPool, user_id: Uuid) -> ApiResult<Decimal> {
    let row: Option<(Decimal,)> =
        sqlx::query_as("SELECT available FROM user_balances WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(available,)| available).unwrap_or(Decimal::ZERO))
}

/// Debit a user's available balance inside the caller's transaction.
///
/// The update is conditional on `available >= amount`, so an insufficient
/// balance is an atomic zero-row outcome rather than a read-then-write race.
pub async fn debit(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount: Decimal,
) -> ApiResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE user_balances
        SET available = available - $2, updated_at = NOW()
        WHERE user_id = $1 AND available >= $2
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::InsufficientBalance(format!(
            "available balance is below {}",
            amount
        )));
    }

    Ok(())
}

/// Credit a user's available balance inside the caller's transaction
pub async fn credit(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount: Decimal,
) -> ApiResult<()> {
    sqlx::query(
        r#"
        INSERT INTO user_balances (user_id, available, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id)
        DO UPDATE SET available = user_balances.available + EXCLUDED.available, updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
