/**
 * Comment Routes
 * Per-work comment threads
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::routes::{error_reply, SuccessResponse};
use crate::store::models::{Comment, NewComment};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
    pub total: usize,
}

/// Body for POST /api/works/{id}/comments; the work id comes from the path.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentRequest {
    pub user_id: String,
    pub user_name: String,
    pub text: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/works/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(work_id): Path<String>,
) -> impl IntoResponse {
    let comments = state.store.get_comments(&work_id).await;
    let total = comments.len();
    Json(CommentListResponse { comments, total })
}

/// POST /api/works/{id}/comments
pub async fn post_comment(
    State(state): State<AppState>,
    Path(work_id): Path<String>,
    Json(payload): Json<PostCommentRequest>,
) -> impl IntoResponse {
    let draft = NewComment {
        work_id,
        user_id: payload.user_id,
        user_name: payload.user_name,
        text: payload.text,
    };
    match state.store.add_comment(draft).await {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "comment rejected");
            error_reply(&e).into_response()
        }
    }
}

/// DELETE /api/works/{id}/comments/{commentId}
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((work_id, comment_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.store.delete_comment(&work_id, &comment_id).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => error_reply(&e).into_response(),
    }
}
