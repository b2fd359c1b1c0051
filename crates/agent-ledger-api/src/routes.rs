//! API Routes
//!
//! Route definitions for all API endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Create API v1 routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Spend-checked action log
        .route(
            "/actions",
            post(handlers::action::submit_action).get(handlers::action::list_actions),
        )
        // Agent registry
        .route(
            "/agents",
            get(handlers::agent::list_agents).post(handlers::agent::create_agent),
        )
        .route(
            "/agents/:id",
            get(handlers::agent::get_agent).patch(handlers::agent::update_agent),
        )
        .route("/agents/:id/reset", post(handlers::agent::reset_agent))
        // Alerts
        .route("/alerts", get(handlers::alert::list_alerts))
}

/// Swagger UI routes
pub fn swagger_routes() -> Router<Arc<AppState>> {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;
    use crate::openapi::ApiDoc;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()))
}
