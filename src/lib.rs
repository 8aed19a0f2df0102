//! Creative Vault backend - library for app logic and testing

pub mod logging;
pub mod routes;
pub mod session;
pub mod store;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use session::SessionManager;
use store::Store;

/// Shared handler state: the document store, the session manager bound to
/// it, and the configured owner email the `/api/owner` lookup uses.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub session: SessionManager,
    pub owner_email: String,
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                "http://localhost:3000".parse().unwrap(),
                "http://127.0.0.1:3000".parse().unwrap(),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    Router::new()
        .route("/api/auth/signup", post(routes::auth::sign_up))
        .route("/api/auth/signin", post(routes::auth::sign_in))
        .route("/api/auth/signout", post(routes::auth::sign_out))
        .route("/api/auth/session", get(routes::auth::get_session))
        .route("/api/auth/profile", patch(routes::auth::update_profile))
        .route("/api/auth/password", post(routes::auth::update_password))
        .route(
            "/api/auth/forgot-password",
            post(routes::auth::forgot_password),
        )
        .route("/api/users/{uid}", get(routes::auth::get_user))
        .route("/api/owner", get(routes::auth::get_owner))
        .route(
            "/api/works",
            get(routes::works::list_works).post(routes::works::add_work),
        )
        .route(
            "/api/works/{id}",
            get(routes::works::get_work).delete(routes::works::delete_work),
        )
        .route(
            "/api/works/{id}/view",
            post(routes::works::increment_view_count),
        )
        .route("/api/works/{id}/like", post(routes::works::toggle_like))
        .route(
            "/api/works/{id}/comments",
            get(routes::comments::list_comments).post(routes::comments::post_comment),
        )
        .route(
            "/api/works/{id}/comments/{commentId}",
            delete(routes::comments::delete_comment),
        )
        .route(
            "/api/settings",
            get(routes::settings::get_settings).put(routes::settings::update_settings),
        )
        .route(
            "/api/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/api/notifications/read",
            post(routes::notifications::mark_read),
        )
        .route(
            "/api/uploads",
            get(routes::upload::list_files).post(routes::upload::upload_file),
        )
        .route("/api/uploads/{filename}", delete(routes::upload::delete_file))
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/store", get(routes::health::health_store))
        .route("/health/ready", get(routes::health::health_ready))
        .route("/rss.xml", get(routes::rss::rss_feed))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd automatically
        .layer(CompressionLayer::new())
        // Global 12 MB request body cap: uploads are capped at 10 MB plus
        // multipart framing, everything else is far smaller
        .layer(RequestBodyLimitLayer::new(12 * 1024 * 1024))
        .layer(cors)
        .with_state(state)
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init();

    routes::health::init_start_time();

    let owner_email =
        std::env::var("OWNER_EMAIL").unwrap_or_else(|_| "owner@example.com".to_string());
    let owner_profile_id =
        std::env::var("OWNER_PROFILE_ID").unwrap_or_else(|_| "owner-admin".to_string());

    let environment = std::env::var("ENVIRONMENT").unwrap_or_default();
    if environment == "production" && owner_email == "owner@example.com" {
        tracing::warn!(
            "OWNER_EMAIL is using the placeholder default. \
             Set OWNER_EMAIL to the real owner address before going live."
        );
    }

    let data_dir = std::env::var("VAULT_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let store = match Store::open(&data_dir) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(data_dir = %data_dir, error = %e, "cannot open vault store");
            panic!("Failed to open vault store at {data_dir}");
        }
    };
    if let Err(e) = store.seed_if_empty(&owner_email, &owner_profile_id) {
        tracing::error!(error = %e, "failed to seed vault store");
    }

    let session = SessionManager::new(store.clone());
    // Keep a process-lifetime subscriber so every auth transition lands in
    // the logs; the guard must outlive `serve`.
    let _auth_log = session.subscribe(|user| match user {
        Some(user) => tracing::info!(uid = %user.uid, "auth state changed"),
        None => tracing::info!("auth state changed to anonymous"),
    });

    let state = AppState {
        store,
        session,
        owner_email,
    };
    let app = create_app(state);

    // Bind address is configurable via HOST / PORT env vars, defaulting to
    // 127.0.0.1:3001 so existing dev setups keep working unchanged.
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST/PORT configuration");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body, Bytes};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use crate::session::SessionManager;
    use crate::store::test_support::{seeded_store, OWNER_EMAIL};
    use crate::AppState;

    pub fn test_state() -> AppState {
        let store = seeded_store();
        let session = SessionManager::new(store.clone());
        AppState {
            store,
            session,
            owner_email: OWNER_EMAIL.to_string(),
        }
    }

    /// Fresh app over a seeded in-memory store.
    pub fn test_app() -> Router {
        crate::create_app(test_state())
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, bytes)
    }

    fn parse<T: DeserializeOwned>(bytes: &Bytes) -> T {
        serde_json::from_slice(bytes).unwrap_or_else(|e| {
            panic!("unparseable body: {e}: {}", String::from_utf8_lossy(bytes))
        })
    }

    pub async fn get_json<T: DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let (status, bytes) = send(app, req).await;
        (status, parse(&bytes))
    }

    pub async fn get_status(app: Router, uri: &str) -> StatusCode {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        send(app, req).await.0
    }

    pub async fn post_json<T, B>(app: Router, uri: &str, json: &B) -> (StatusCode, T)
    where
        T: DeserializeOwned,
        B: serde::Serialize,
    {
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap();
        let (status, bytes) = send(app, req).await;
        (status, parse(&bytes))
    }

    pub async fn post_empty(app: Router, uri: &str) -> StatusCode {
        let req = Request::post(uri).body(Body::empty()).unwrap();
        send(app, req).await.0
    }

    pub async fn put_json<T, B>(app: Router, uri: &str, json: &B) -> (StatusCode, T)
    where
        T: DeserializeOwned,
        B: serde::Serialize,
    {
        let req = Request::put(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap();
        let (status, bytes) = send(app, req).await;
        (status, parse(&bytes))
    }

    pub async fn put_status<B: serde::Serialize>(app: Router, uri: &str, json: &B) -> StatusCode {
        let req = Request::put(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap();
        send(app, req).await.0
    }

    pub async fn delete<T: DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
        let req = Request::delete(uri).body(Body::empty()).unwrap();
        let (status, bytes) = send(app, req).await;
        (status, parse(&bytes))
    }
}
