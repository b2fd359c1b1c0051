//! OpenAPI Documentation
//!
//! Generated OpenAPI 3.0 document for the Agent Ledger API.

use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

/// Agent Ledger API Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agent Ledger API",
        description = "Spend tracking and budget enforcement for autonomous agents.",
        version = "0.1.0",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    paths(
        // Health
        handlers::health::health_check,
        handlers::health::readiness_check,
        // Agents
        handlers::agent::list_agents,
        handlers::agent::create_agent,
        handlers::agent::get_agent,
        handlers::agent::update_agent,
        handlers::agent::reset_agent,
        // Actions
        handlers::action::submit_action,
        handlers::action::list_actions,
        // Alerts
        handlers::alert::list_alerts,
    ),
    components(
        schemas(
            // Common
            ErrorResponse,
            dto::SuccessResponse,
            dto::AgentNameRef,
            handlers::health::HealthResponse,
            handlers::health::ReadinessResponse,
            // Agents
            dto::CreateAgentRequest,
            dto::UpdateAgentRequest,
            dto::AgentResponse,
            dto::AgentSummary,
            dto::AgentDetail,
            // Actions
            dto::SubmitActionRequest,
            dto::ActionResponse,
            dto::ActionEntryResponse,
            // Alerts
            dto::AlertResponse,
            dto::AlertEntryResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health and status"),
        (name = "Agents", description = "Agent registry, limits and reset"),
        (name = "Actions", description = "Spend-checked action logging"),
        (name = "Alerts", description = "Auto-pause alerts")
    )
)]
pub struct ApiDoc;

/// Get the OpenAPI JSON document
pub fn openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_json()
}
