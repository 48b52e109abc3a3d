//! HTTP API for publishing, scheduling, and connection health.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use libcrosspost::{ConnectionRegistry, CrosspostError, Lifecycle, Publisher};

#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<Publisher>,
    pub registry: Arc<ConnectionRegistry>,
    pub lifecycle: Arc<Lifecycle>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/social-posts/:id/publish", post(publish_post))
        .route("/social-posts/bulk-publish", post(bulk_publish))
        .route("/social-posts/:id/schedule", post(schedule_post))
        .route("/connection/status", get(connection_status))
        .route("/connection/validate", post(validate_connections))
        .with_state(state)
}

/// Map a core error to an HTTP error response.
fn error_response(e: CrosspostError) -> Response {
    let status = match &e {
        CrosspostError::PostNotFound(_) => StatusCode::NOT_FOUND,
        CrosspostError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

async fn publish_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let report = match state.publisher.publish_post_by_id(&id).await {
        Ok((_, report)) => report,
        Err(e) => return error_response(e),
    };

    // The status write belongs to the lifecycle coordinator
    match state.lifecycle.record_publish(&id, &report).await {
        Ok(post) => (
            StatusCode::OK,
            Json(json!({ "post": post, "results": report })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct BulkPublishRequest {
    ids: Vec<String>,
}

async fn bulk_publish(
    State(state): State<AppState>,
    Json(request): Json<BulkPublishRequest>,
) -> Response {
    let bulk = state.publisher.bulk_publish(&request.ids).await;

    for entry in &bulk.results {
        if let Err(e) = state.lifecycle.record_publish(&entry.id, &entry.report).await {
            // Entries that never loaded have no record to update
            debug!(post_id = %entry.id, error = %e, "skipping lifecycle update");
        }
    }

    (StatusCode::OK, Json(bulk)).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRequest {
    scheduled_at: i64,
    timezone: Option<String>,
}

async fn schedule_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ScheduleRequest>,
) -> Response {
    match state
        .lifecycle
        .schedule_post(&id, request.scheduled_at, request.timezone.as_deref())
        .await
    {
        Ok(post) => (StatusCode::OK, Json(post)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn connection_status(State(state): State<AppState>) -> Response {
    let statuses = state.registry.status_for_all().await;
    (StatusCode::OK, Json(json!({ "data": statuses }))).into_response()
}

async fn validate_connections(State(state): State<AppState>) -> Response {
    let results = state.registry.validate_all().await;
    (StatusCode::OK, Json(json!({ "data": results }))).into_response()
}
