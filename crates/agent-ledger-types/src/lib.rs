//! Agent Ledger Types - Canonical domain types for agent spend tracking
//!
//! This crate contains the foundational types shared by every other
//! agent-ledger crate:
//!
//! - Identity types (AgentId, ActionId, AlertId)
//! - Agents, their limits and status
//! - Action log records and opaque action metadata
//! - Alerts raised on auto-pause
//! - Spend windows and the clocks that produce them
//!
//! Money is always [`rust_decimal::Decimal`].

pub mod identity;
pub mod agent;
pub mod action;
pub mod alert;
pub mod window;
pub mod money;
pub mod error;

pub use identity::*;
pub use agent::*;
pub use action::*;
pub use alert::*;
pub use window::*;
pub use money::*;
pub use error::*;

pub use rust_decimal::Decimal;
