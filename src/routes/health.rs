/**
 * Health Routes
 * Endpoints for checking backend health status
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::AppState;

// Track server start time for uptime calculation
lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

/// Initialize the server start time
pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub store: ServiceCheck,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

fn store_check(state: &AppState) -> ServiceCheck {
    match state.store.probe() {
        Ok(duration) => ServiceCheck {
            status: "healthy".to_string(),
            response_time: Some(duration.as_millis() as u64),
            error: None,
        },
        Err(e) => ServiceCheck {
            status: "unhealthy".to_string(),
            response_time: None,
            error: Some(e.to_string()),
        },
    }
}

/// GET /health - Simple health ping
pub async fn health_ping() -> impl IntoResponse {
    Json(SimpleHealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /health/detailed - Detailed health with the store check
pub async fn health_detailed(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = SERVER_START.elapsed().as_secs();
    let store = store_check(&state);

    // Overall status stays "ok" while the process is serving; the store
    // check tells the frontend whether persistence is usable.
    let response = DetailedHealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime: Some(uptime),
        checks: HealthChecks { store },
    };

    (StatusCode::OK, Json(response))
}

/// GET /health/store - Persistence adapter round-trip check
pub async fn health_store(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(store_check(&state)))
}

/// GET /health/ready - Readiness check
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = SERVER_START.elapsed().as_secs();
    let store = store_check(&state);
    let is_ready = store.status == "healthy";

    let response = ReadyResponse {
        status: if is_ready {
            "ready".to_string()
        } else {
            "not ready".to_string()
        },
        timestamp: Utc::now(),
        uptime: Some(uptime),
        reason: if is_ready {
            None
        } else {
            Some("store is not healthy".to_string())
        },
    };

    (StatusCode::OK, Json(response))
}
