//! Shared API response envelope
//!
//! Domain models live next to their services (`pricing::model`,
//! `staking::model`); this module only carries the wire envelope every
//! handler returns.

use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}
