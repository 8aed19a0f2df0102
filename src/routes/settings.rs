/**
 * Settings Routes
 * The owner-edited site settings singleton
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::routes::{error_reply, SuccessResponse};
use crate::store::models::SiteSettings;
use crate::AppState;

/// GET /api/settings
/// Always a normalized document: exactly ten tagline slots, sequences
/// present even when the stored blob predates them.
pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.get_site_settings().await)
}

/// PUT /api/settings - full replace
pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<SiteSettings>,
) -> impl IntoResponse {
    match state.store.update_site_settings(&payload).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "settings update failed");
            error_reply(&e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::TAGLINE_SLOTS;
    use crate::test_support::{get_json, put_json, put_status, test_app};

    #[tokio::test]
    async fn test_get_settings_has_ten_tagline_slots() {
        let app = test_app();
        let (status, settings) = get_json::<SiteSettings>(app, "/api/settings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings.taglines.len(), TAGLINE_SLOTS);
    }

    #[tokio::test]
    async fn test_update_settings_round_trips() {
        let app = test_app();
        let (_, mut settings) = get_json::<SiteSettings>(app.clone(), "/api/settings").await;
        settings.cover_pages = vec!["https://example.com/cover.jpg".to_string()];

        let (status, _) =
            put_json::<SuccessResponse, _>(app.clone(), "/api/settings", &settings).await;
        assert_eq!(status, StatusCode::OK);

        let (_, read_back) = get_json::<SiteSettings>(app, "/api/settings").await;
        assert_eq!(read_back.cover_pages, settings.cover_pages);
    }

    #[tokio::test]
    async fn test_update_with_unknown_icon_is_rejected() {
        let app = test_app();
        // Bypass the typed request struct: an unknown icon identifier must
        // fail at the boundary, before anything is stored.
        let body = serde_json::json!({
            "coverPages": [],
            "taglines": [],
            "socialLinks": [
                {"id": "sl-9", "name": "X", "url": "https://x.com", "icon": "Mastodon"}
            ]
        });
        let status = put_status(app, "/api/settings", &body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
