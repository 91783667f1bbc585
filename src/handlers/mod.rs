//! HTTP handlers

mod pricing;
mod staking;

pub use pricing::*;
pub use staking::*;
