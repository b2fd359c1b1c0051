//! Custom Axum Extractors
//!
//! Request extractors for validated bodies and agent ids in paths.

use agent_ledger_types::AgentId;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorResponse};

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// JSON body that has passed its `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + validator::Validate,
{
    type Rejection = Response;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| error_response(ApiError::BadRequest(e.body_text())))?;

        value.validate().map_err(|e| {
            error_response(ApiError::ValidationError(format_validation_errors(&e)))
        })?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Agent Path Extractor
// =============================================================================

/// Agent id from the `:id` path segment.
///
/// Accepts a bare UUID or the `agent_` prefixed form. A segment that is not
/// an id at all cannot name an agent, so it is reported as not found.
pub struct AgentPath(pub AgentId);

#[async_trait]
impl<S> FromRequestParts<S> for AgentPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| error_response(ApiError::BadRequest(e.body_text())))?;

        AgentId::parse(&raw)
            .map(AgentPath)
            .map_err(|_| error_response(ApiError::AgentNotFound))
    }
}

/// Parse an optional `agentId` query value
pub fn parse_agent_filter(raw: Option<&str>) -> Result<Option<AgentId>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => AgentId::parse(raw)
            .map(Some)
            .map_err(|_| ApiError::ValidationError(format!("invalid agentId: {}", raw))),
        None => Ok(None),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Create an error response
pub fn error_response(error: ApiError) -> Response {
    let status = error.status_code();
    let response = ErrorResponse::from(&error);

    (status, Json(response)).into_response()
}

/// Format validation errors into a readable string
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}
