//! Error types for Agent Ledger domain values

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for domain-level validation
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Domain validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// A limit that must be strictly positive was zero or negative
    #[error("{field} must be greater than zero, got {value}")]
    NonPositiveLimit { field: &'static str, value: Decimal },

    /// An amount with more decimal places than storage keeps
    #[error("{field} allows at most {max_scale} decimal places, got {value}")]
    TooPrecise { field: &'static str, value: Decimal, max_scale: u32 },

    /// An amount too large to store
    #[error("{field} must be less than 1000000000000, got {value}")]
    AmountOutOfRange { field: &'static str, value: Decimal },

    /// An action cost below zero
    #[error("cost must not be negative, got {0}")]
    NegativeCost(Decimal),

    /// A required text field was empty
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Unrecognised agent status label
    #[error("unknown agent status: {0}")]
    UnknownStatus(String),

    /// Unrecognised action outcome label
    #[error("unknown action outcome: {0}")]
    UnknownOutcome(String),

    /// Unrecognised alert type label
    #[error("unknown alert type: {0}")]
    UnknownAlertKind(String),

    /// Unparseable UTC offset setting
    #[error("invalid UTC offset: {0}")]
    InvalidOffset(String),
}
