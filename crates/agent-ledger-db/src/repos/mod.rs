//! Repository implementations

mod agent;
mod action;
mod alert;

pub use agent::AgentRepo;
pub use action::ActionRepo;
pub use alert::AlertRepo;
