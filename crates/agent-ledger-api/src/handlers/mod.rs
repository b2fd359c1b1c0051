//! API Handlers
//!
//! Request handlers for all API endpoints.

pub mod health;
pub mod agent;
pub mod action;
pub mod alert;
