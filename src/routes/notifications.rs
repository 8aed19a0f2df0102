/**
 * Notification Routes
 * One-shot fetch-and-filter delivery plus read marking
 */
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::routes::{error_reply, SuccessResponse};
use crate::store::models::Notification;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MarkReadRequest {
    pub ids: Vec<String>,
}

/// GET /api/notifications?userId=...
///
/// Polling is the delivery contract here: the client re-fetches when it
/// wants fresh state. A push channel would slot in behind this same
/// handler without changing the store.
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationsQuery>,
) -> impl IntoResponse {
    let notifications = state.store.get_notifications(&query.user_id).await;
    let unread = notifications.iter().filter(|n| !n.read).count();
    Json(NotificationListResponse {
        notifications,
        unread,
    })
}

/// POST /api/notifications/read
pub async fn mark_read(
    State(state): State<AppState>,
    Json(payload): Json<MarkReadRequest>,
) -> impl IntoResponse {
    match state.store.mark_notifications_as_read(&payload.ids).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to mark notifications read");
            error_reply(&e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_json, get_status, post_json, test_app};

    #[tokio::test]
    async fn test_list_and_mark_read() {
        let app = test_app();
        let (status, list) = get_json::<NotificationListResponse>(
            app.clone(),
            "/api/notifications?userId=owner-001",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.unread, 1);

        let ids: Vec<String> = list.notifications.iter().map(|n| n.id.clone()).collect();
        let (status, _) = post_json::<SuccessResponse, _>(
            app.clone(),
            "/api/notifications/read",
            &MarkReadRequest { ids },
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, after) = get_json::<NotificationListResponse>(
            app,
            "/api/notifications?userId=owner-001",
        )
        .await;
        assert_eq!(after.unread, 0);
        assert_eq!(after.notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_list_for_user_without_notifications() {
        let app = test_app();
        let (status, list) = get_json::<NotificationListResponse>(
            app,
            "/api/notifications?userId=reader-001",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(list.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_id_param_is_bad_request() {
        let app = test_app();
        assert_eq!(
            get_status(app, "/api/notifications").await,
            StatusCode::BAD_REQUEST
        );
    }
}
