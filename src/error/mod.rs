//! Centralized API error handling
//!
//! This module provides a unified error type for API responses with proper
//! HTTP status code mapping and JSON error responses. The staking and
//! pricing services return these directly so handlers stay thin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid staking plan: {0}")]
    InvalidPlan(String),

    #[error("Below minimum stake: {0}")]
    BelowMinimum(String),

    #[error("Above maximum stake: {0}")]
    AboveMaximum(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Not eligible: {0}")]
    NotEligible(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Price unavailable: {0}")]
    PriceUnavailable(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidPlan(_) => "INVALID_PLAN",
            ApiError::BelowMinimum(_) => "BELOW_MINIMUM",
            ApiError::AboveMaximum(_) => "ABOVE_MAXIMUM",
            ApiError::InsufficientBalance(_) => "INSUFFICIENT_BALANCE",
            ApiError::NotEligible(_) => "NOT_ELIGIBLE",
            ApiError::InvalidAmount(_) => "INVALID_AMOUNT",
            ApiError::PriceUnavailable(_) => "PRICE_UNAVAILABLE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPlan(_)
            | ApiError::BelowMinimum(_)
            | ApiError::AboveMaximum(_)
            | ApiError::InsufficientBalance(_)
            | ApiError::NotEligible(_)
            | ApiError::InvalidAmount(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PriceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        // Log server errors
        match &self {
            ApiError::InternalError(_)
            | ApiError::DatabaseError(_)
            | ApiError::ExternalServiceError(_) => {
                tracing::error!(error = %message, code = %error_code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %message, code = %error_code, "Client error occurred");
            }
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Convenience conversions from common error types

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            _ => ApiError::DatabaseError(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::ExternalServiceError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Invalid JSON: {}", err))
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError::InvalidPlan("test".to_string()).error_code(),
            "INVALID_PLAN"
        );
        assert_eq!(
            ApiError::BelowMinimum("test".to_string()).error_code(),
            "BELOW_MINIMUM"
        );
        assert_eq!(
            ApiError::NotEligible("test".to_string()).error_code(),
            "NOT_ELIGIBLE"
        );
        assert_eq!(
            ApiError::PriceUnavailable("test".to_string()).error_code(),
            "PRICE_UNAVAILABLE"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::InvalidPlan("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotEligible("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PriceUnavailable("test".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::NotFound("test".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InternalError("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
