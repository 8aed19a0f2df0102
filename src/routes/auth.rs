/**
 * Auth Routes
 * Session lifecycle: sign-up, sign-in, sign-out, profile and password flows
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::routes::{error_reply, error_status, ErrorResponse, SuccessResponse};
use crate::store::models::{ProfileUpdate, User};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResponse {
    fn ok(user: Option<User>) -> Self {
        Self {
            success: true,
            user,
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            user: None,
            error: Some(message),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateRequest {
    pub new_password: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> impl IntoResponse {
    match state.session.sign_up(&payload.email, &payload.password).await {
        Ok(user) => (StatusCode::CREATED, Json(AuthResponse::ok(Some(user)))),
        Err(e) => {
            tracing::warn!(error = %e, "sign-up rejected");
            (error_status(&e), Json(AuthResponse::err(e.to_string())))
        }
    }
}

/// POST /api/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> impl IntoResponse {
    match state.session.sign_in(&payload.email, &payload.password).await {
        Ok(user) => (StatusCode::OK, Json(AuthResponse::ok(Some(user)))),
        Err(e) => {
            tracing::warn!(error = %e, "sign-in rejected");
            (error_status(&e), Json(AuthResponse::err(e.to_string())))
        }
    }
}

/// POST /api/auth/signout
pub async fn sign_out(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.sign_out().await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "sign-out failed");
            error_reply(&e).into_response()
        }
    }
}

/// GET /api/auth/session
/// The current session state; `user` is null when anonymous.
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    Json(AuthResponse::ok(state.session.current_user()))
}

/// PATCH /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Json(payload): Json<ProfileUpdate>,
) -> impl IntoResponse {
    match state.session.update_profile(payload).await {
        Ok(user) => (StatusCode::OK, Json(AuthResponse::ok(Some(user)))),
        Err(e) => (error_status(&e), Json(AuthResponse::err(e.to_string()))),
    }
}

/// POST /api/auth/password
pub async fn update_password(
    State(state): State<AppState>,
    Json(payload): Json<PasswordUpdateRequest>,
) -> impl IntoResponse {
    match state.session.update_password(&payload.new_password).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => error_reply(&e).into_response(),
    }
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> impl IntoResponse {
    match state.session.forgot_password(&payload.email).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => error_reply(&e).into_response(),
    }
}

/// GET /api/users/{uid}
pub async fn get_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> impl IntoResponse {
    match state.store.get_user_by_id(&uid).await {
        Some(user) => (StatusCode::OK, Json(user)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("user not found")),
        )
            .into_response(),
    }
}

/// GET /api/owner
/// The distinguished owner account's public profile.
pub async fn get_owner(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.get_owner_profile(&state.owner_email).await {
        Some(user) => (StatusCode::OK, Json(user)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("owner profile not found")),
        )
            .into_response(),
    }
}
