//! Daily reward scheduler
//!
//! Drives `StakeLedger::accrue_daily` once per calendar day. The as-of
//! date is computed at fire time, so a process that was down across
//! midnight accrues for the day it wakes up on; missed days are not
//! back-filled here (an operator can replay one through the accrue
//! endpoint). Duplicate or overlapping runs are harmless because the
//! ledger's per-(stake, date) guard does the real work.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use super::ledger::StakeLedger;

/// Upper bound on one accrual run; a run that exceeds it is abandoned and
/// left to the next scheduled tick
const RUN_TIMEOUT: Duration = Duration::from_secs(600);

/// Recurring job driver for daily reward accrual
pub struct RewardScheduler {
    ledger: Arc<StakeLedger>,
    cron_expression: String,
}

impl RewardScheduler {
    /// Create a new reward scheduler
    pub fn new(ledger: Arc<StakeLedger>, cron_expression: String) -> Self {
        Self {
            ledger,
            cron_expression,
        }
    }

    /// Register and start the daily job. The returned scheduler handle
    /// keeps the job registered; hold it for the life of the process.
    pub async fn start(&self) -> anyhow::Result<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow::anyhow!("failed to create job scheduler: {}", e))?;

        let ledger = self.ledger.clone();
        let job = Job::new_async(self.cron_expression.as_str(), move |_uuid, _lock| {
            let ledger = ledger.clone();
            Box::pin(async move {
                run_accrual(ledger).await;
            })
        })
        .map_err(|e| anyhow::anyhow!("invalid accrual cron expression: {}", e))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| anyhow::anyhow!("failed to register accrual job: {}", e))?;

        scheduler
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start job scheduler: {}", e))?;

        tracing::info!(cron = %self.cron_expression, "Reward scheduler started");

        Ok(scheduler)
    }
}

/// One scheduled accrual run for today, bounded by RUN_TIMEOUT
async fn run_accrual(ledger: Arc<StakeLedger>) {
    let as_of_date = Utc::now().date_naive();
    tracing::info!(as_of_date = %as_of_date, "Scheduled reward accrual starting");

    match tokio::time::timeout(RUN_TIMEOUT, ledger.accrue_daily(as_of_date)).await {
        Ok(Ok(summary)) => {
            tracing::info!(
                as_of_date = %summary.as_of_date,
                processed = summary.processed_count,
                completed = summary.completed_count,
                "Scheduled reward accrual finished"
            );
        }
        Ok(Err(e)) => {
            tracing::error!(
                as_of_date = %as_of_date,
                error = %e,
                "Scheduled reward accrual failed, will retry on next tick"
            );
        }
        Err(_) => {
            tracing::error!(
                as_of_date = %as_of_date,
                timeout_secs = RUN_TIMEOUT.as_secs(),
                "Scheduled reward accrual timed out, will retry on next tick"
            );
        }
    }
}
