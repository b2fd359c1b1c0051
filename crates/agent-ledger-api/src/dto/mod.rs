//! Data Transfer Objects
//!
//! Request and response structures for the API. Field names are camelCase
//! and money is a decimal string.

pub mod agent;
pub mod action;
pub mod alert;
pub mod common;

pub use agent::*;
pub use action::*;
pub use alert::*;
pub use common::*;
