use std::sync::{Arc, OnceLock};

use axum::body::{to_bytes, Body};
use axum::extract::Path;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_http::normalize_path::NormalizePath;

use crate::api;
use crate::core::{config::Settings, state::AppState};
use crate::services::rois::RoiService;

pub(crate) struct TestContext {
    pub(crate) app: NormalizePath<Router>,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    dotenvy::dotenv().ok();

    std::env::set_var("OL3_ENV", "test");
    std::env::set_var("OL3_STRICT_CONFIG", "0");
    std::env::remove_var("UPSTREAM_BASE_URL");
    std::env::remove_var("UPSTREAM_ROIS_PATH");
    std::env::set_var("UPSTREAM_MAX_RETRIES", "0");
    std::env::set_var("UPSTREAM_TIMEOUT_SECONDS", "5");
    std::env::set_var("UPSTREAM_CONNECT_TIMEOUT_SECONDS", "2");
    std::env::remove_var("VIEWER_TITLE");
    std::env::remove_var("VIEWER_STATIC_PREFIX");
    std::env::remove_var("VIEWER_SCRIPT");
    std::env::remove_var("VIEWER_DEBUG_SCRIPT");
    std::env::remove_var("BACKEND_CORS_ORIGINS");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
}

pub(crate) async fn setup_test_context() -> TestContext {
    let guard = env_lock().await;
    set_test_env();
    build_context(guard)
}

/// Spawn `upstream` on a loopback port and point the service at it before
/// loading settings.
pub(crate) async fn setup_test_context_with_upstream(upstream: Router) -> TestContext {
    let guard = env_lock().await;
    set_test_env();

    let base_url = spawn_upstream(upstream).await;
    std::env::set_var("UPSTREAM_BASE_URL", &base_url);

    build_context(guard)
}

fn build_context(guard: OwnedMutexGuard<()>) -> TestContext {
    let settings = Settings::load().expect("settings");
    TestContext { app: build_app(settings), _guard: guard }
}

pub(crate) fn build_app(settings: Settings) -> NormalizePath<Router> {
    let rois = RoiService::from_settings(&settings).expect("roi service");
    api::router::router(AppState::new(settings, rois))
}

pub(crate) async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve upstream");
    });
    format!("http://{addr}")
}

pub(crate) fn upstream_rois_ok(payload: serde_json::Value) -> Router {
    Router::new().route(
        "/webgateway/get_rois_json/:iid",
        get(move |Path(_iid): Path<i64>| {
            let payload = payload.clone();
            async move { Json(payload) }
        }),
    )
}

pub(crate) fn upstream_rois_not_found() -> Router {
    Router::new().route(
        "/webgateway/get_rois_json/:iid",
        get(|Path(_iid): Path<i64>| async {
            (StatusCode::NOT_FOUND, Json(serde_json::json!({"message": "image not found"})))
        }),
    )
}

pub(crate) fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}

pub(crate) async fn read_text(response: axum::response::Response<Body>) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    String::from_utf8(body.to_vec()).expect("utf8 body")
}
