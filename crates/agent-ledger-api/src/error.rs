//! API error handling
//!
//! Every failure leaves the API as `{"code": <i32>, "error": "<message>"}`
//! with a matching HTTP status.

use agent_ledger_db::DbError;
use agent_ledger_guard::GuardError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Request Errors (-1100 to -1199)
    // =========================================================================
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("{0}")]
    ValidationError(String),

    // =========================================================================
    // Spend Errors (-2000 to -2099)
    // =========================================================================
    #[error("Agent not found")]
    AgentNotFound,

    #[error("Agent is paused")]
    AgentPaused,

    #[error("{0}")]
    PerActionLimitExceeded(String),

    #[error("Monthly budget exceeded. Agent has been paused.")]
    BudgetExceeded,

    // =========================================================================
    // Internal (-5000 to -5099)
    // =========================================================================
    #[error("Internal server error")]
    Internal(String),

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Database error")]
    DatabaseError,
}

impl ApiError {
    pub fn error_code(&self) -> i32 {
        match self {
            Self::BadRequest(_) => -1100,
            Self::ValidationError(_) => -1102,

            Self::AgentNotFound => -2001,
            Self::AgentPaused => -2010,
            Self::PerActionLimitExceeded(_) => -2011,
            Self::BudgetExceeded => -2012,

            Self::Internal(_) => -5000,
            Self::ServiceUnavailable => -5001,
            Self::DatabaseError => -5002,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::ValidationError(_)
            | Self::PerActionLimitExceeded(_) => StatusCode::BAD_REQUEST,

            Self::AgentPaused | Self::BudgetExceeded => StatusCode::FORBIDDEN,

            Self::AgentNotFound => StatusCode::NOT_FOUND,

            Self::Internal(_) | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: i32,
    /// Human-readable error message
    pub error: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.error_code(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            tracing::error!(error = %cause, "Internal error");
        }

        let status = self.status_code();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::AgentPaused => Self::AgentPaused,
            GuardError::PerActionLimitExceeded { .. } => Self::PerActionLimitExceeded(err.to_string()),
            GuardError::MonthlyBudgetExceeded { .. } => Self::BudgetExceeded,
            GuardError::NegativeCost(_) | GuardError::SpendOverflow { .. } => {
                Self::ValidationError(err.to_string())
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(_) => Self::AgentNotFound,
            DbError::InvalidInput(msg) => Self::ValidationError(msg),
            other => {
                tracing::error!(error = ?other, "Database error");
                Self::DatabaseError
            }
        }
    }
}

impl From<agent_ledger_types::LedgerError> for ApiError {
    fn from(err: agent_ledger_types::LedgerError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!("{}: {}", field, e.message.as_ref().map(|m| m.as_ref()).unwrap_or("invalid"))
                })
            })
            .collect();
        Self::ValidationError(messages.join(", "))
    }
}
