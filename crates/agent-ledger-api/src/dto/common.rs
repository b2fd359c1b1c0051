//! Common DTO types

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Generic success response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    /// Success indicator
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Optional per-agent filter for listings
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AgentFilterQuery {
    /// Only return records of this agent
    pub agent_id: Option<String>,
}

/// Agent name embedded in listing entries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentNameRef {
    pub name: String,
}
