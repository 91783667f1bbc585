//! Staking domain module
//!
//! Plan catalog, stake ledger state machine, and the daily reward
//! scheduler.

mod ledger;
mod model;
mod plans;
mod scheduler;

pub use ledger::StakeLedger;
pub use model::*;
pub use plans::PlanCatalog;
pub use scheduler::RewardScheduler;
