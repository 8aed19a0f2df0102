/**
 * Work Routes
 * CRUD, view counting and like toggling for uploaded works
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::routes::{error_reply, ErrorResponse, SuccessResponse};
use crate::store::models::{NewWork, Work};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for GET /api/works (list)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkListResponse {
    pub works: Vec<Work>,
    pub total: usize,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub user_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/works - all works, newest upload first
pub async fn list_works(State(state): State<AppState>) -> impl IntoResponse {
    let works = state.store.get_works().await;
    let total = works.len();
    Json(WorkListResponse { works, total })
}

/// POST /api/works - publish a new work
pub async fn add_work(
    State(state): State<AppState>,
    Json(payload): Json<NewWork>,
) -> impl IntoResponse {
    match state.store.add_work(payload).await {
        Ok(work) => (StatusCode::CREATED, Json(work)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "work rejected");
            error_reply(&e).into_response()
        }
    }
}

/// GET /api/works/{id}
pub async fn get_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_work_by_id(&id).await {
        Some(work) => (StatusCode::OK, Json(work)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("work not found")),
        )
            .into_response(),
    }
}

/// DELETE /api/works/{id} - cascade-deletes comments and notifications
pub async fn delete_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let work = match state.store.get_work_by_id(&id).await {
        Some(work) => work,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("work not found")),
            )
                .into_response();
        }
    };

    match state.store.delete_work(&work).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => {
            // A failed step partway through the cascade leaves the earlier
            // steps applied; the caller sees the failure as-is.
            tracing::error!(work_id = %id, error = %e, "cascade delete failed");
            error_reply(&e).into_response()
        }
    }
}

/// POST /api/works/{id}/view
/// Unconditional increment; the client keeps its own per-session marker.
pub async fn increment_view_count(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.increment_view_count(&id).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => error_reply(&e).into_response(),
    }
}

/// POST /api/works/{id}/like - toggle the caller's like, returns the work
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ToggleLikeRequest>,
) -> impl IntoResponse {
    if payload.user_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("userId is required")),
        )
            .into_response();
    }
    match state.store.toggle_like(&id, &payload.user_id).await {
        Ok(work) => (StatusCode::OK, Json(work)).into_response(),
        Err(e) => error_reply(&e).into_response(),
    }
}
