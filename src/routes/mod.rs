//! Route definitions

mod pricing;
mod staking;

pub use pricing::pricing_routes;
pub use staking::staking_routes;
