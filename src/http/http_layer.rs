// HTTP layer - routing, API-key check, and the JSON wire shapes the
// frontend speaks. This is an adapter: it translates between HTTP and the
// core pipeline, and owns the error-to-status mapping.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::health::HealthReporter;
use crate::core::planning::ContentPlan;
use crate::core::provisioning::{DocsProvider, PipelineError, ProvisioningService};

const API_KEY_HEADER: &str = "x-api-key";

/// Shared application state. The pipeline is `None` when credential
/// resolution found nothing; requests then get a 503 while the health
/// endpoint keeps answering.
pub struct AppState<P: DocsProvider> {
    pub pipeline: Option<Arc<ProvisioningService<P>>>,
    pub health: HealthReporter,
    pub api_key: String,
}

// Manual impl: deriving Clone would require P: Clone, but the pipeline is
// only ever shared through the Arc.
impl<P: DocsProvider> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            health: self.health,
            api_key: self.api_key.clone(),
        }
    }
}

pub fn router<P: DocsProvider + 'static>(state: AppState<P>) -> Router {
    Router::new()
        .route("/health", get(health::<P>))
        .route("/create-google-doc", post(create_google_doc::<P>))
        .layer(TraceLayer::new_for_http())
        // The no-code frontend calls from the browser, cross-origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// WIRE SHAPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateDocRequest {
    #[serde(default)]
    content_plan: Option<ContentPlan>,
    #[serde(default)]
    user_email: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateDocResponse {
    success: bool,
    document_id: String,
    share_link: String,
    permission_granted: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

/// Field names kept wire-compatible with the original deployment of this
/// service, so existing frontend workflows keep working.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    google_services_initialized: bool,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
        }),
    )
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health<P: DocsProvider>(State(state): State<AppState<P>>) -> Json<HealthResponse> {
    let status = state.health.status();
    Json(HealthResponse {
        status: "healthy",
        timestamp: status.timestamp,
        google_services_initialized: status.initialized,
    })
}

async fn create_google_doc<P: DocsProvider>(
    State(state): State<AppState<P>>,
    headers: HeaderMap,
    Json(request): Json<CreateDocRequest>,
) -> Result<Json<CreateDocResponse>, (StatusCode, Json<ErrorResponse>)> {
    let presented_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if presented_key != state.api_key {
        return Err(error_response(StatusCode::UNAUTHORIZED, "Invalid API key"));
    }

    let Some(pipeline) = &state.pipeline else {
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Google services not configured",
        ));
    };

    let (Some(plan), Some(user_email)) = (&request.content_plan, &request.user_email) else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Content plan and user email are required",
        ));
    };

    match pipeline.create_plan_document(plan, user_email).await {
        Ok(result) => Ok(Json(CreateDocResponse {
            success: true,
            document_id: result.document_id,
            share_link: result.share_link,
            permission_granted: result.permission_granted,
        })),
        Err(err) => {
            let status = match &err {
                PipelineError::InvalidPlan(_) | PipelineError::MissingRecipient => {
                    StatusCode::BAD_REQUEST
                }
                PipelineError::Provision { .. } => StatusCode::BAD_GATEWAY,
            };
            if status.is_server_error() {
                tracing::error!("document provisioning failed: {err}");
            }
            Err(error_response(status, err.to_string()))
        }
    }
}
