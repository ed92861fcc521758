//! Common test utilities and helpers for ws-api tests
//!
//! Provides the test configuration and application, request helpers and a
//! fake workspace master served on an ephemeral local port.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use ws_activity::ExpiryOrdering;
use ws_api::{AppState, Config};
use ws_core::Clock;

pub const IDLE_TIMEOUT: i64 = 60_000; // 1 minute

/// Helper to create an in-memory test database with migrations
pub async fn create_test_db() -> SqlitePool {
    ws_activity::test_utils::create_test_db().await
}

/// Configuration that never reads the environment
pub fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        db_path: ":memory:".into(),
        workspace_master_url: "http://127.0.0.1:9".to_string(),
        idle_timeout_ms: IDLE_TIMEOUT,
        bootstrap_timeout_minutes: 1,
        activity_check_interval_secs: 1,
        expiry_ordering: ExpiryOrdering::default(),
        endpoint_base: "ws://localhost:3122".to_string(),
    }
}

pub fn create_test_state(pool: SqlitePool, clock: Arc<dyn Clock>) -> AppState {
    AppState::with_clock(pool, &test_config(), clock)
}

/// Helper to extract JSON body from axum response
pub async fn extract_json_body<T>(response: axum::response::Response) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}

/// Poll `condition` until it holds or a few seconds have passed.
pub async fn wait_for<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..500 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// TestClient to encapsulate API interaction logic
pub struct TestClient {
    pub app: Router,
}

impl TestClient {
    pub fn new(state: AppState) -> Self {
        Self {
            app: ws_api::create_app(state),
        }
    }

    /// Send a request to the API
    pub async fn send_request(
        &self,
        request: axum::http::Request<axum::body::Body>,
    ) -> axum::http::Response<axum::body::Body> {
        // Clone the app to allow reuse (Router is cheap to clone)
        use tower::ServiceExt;
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Post JSON to an endpoint
    pub async fn post<T: serde::Serialize>(
        &self,
        uri: &str,
        body: &T,
    ) -> axum::http::Response<axum::body::Body> {
        let req_body = serde_json::to_string(body).expect("Failed to serialize request body");
        let request = axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(axum::body::Body::from(req_body))
            .unwrap();
        self.send_request(request).await
    }

    pub async fn get(&self, uri: &str) -> axum::http::Response<axum::body::Body> {
        self.send_empty("GET", uri).await
    }

    pub async fn put(&self, uri: &str) -> axum::http::Response<axum::body::Body> {
        self.send_empty("PUT", uri).await
    }

    pub async fn delete(&self, uri: &str) -> axum::http::Response<axum::body::Body> {
        self.send_empty("DELETE", uri).await
    }

    async fn send_empty(&self, method: &str, uri: &str) -> axum::http::Response<axum::body::Body> {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(axum::body::Body::empty())
            .unwrap();
        self.send_request(request).await
    }
}

/// In-process stand-in for the workspace master REST API.
#[derive(Default)]
pub struct FakeMaster {
    running: Mutex<HashSet<String>>,
    attributes: Mutex<HashMap<String, HashMap<String, String>>>,
    stopped: Mutex<Vec<String>>,
    unavailable: AtomicBool,
}

impl FakeMaster {
    /// Serve a fresh fake on 127.0.0.1 and return it with its base URL.
    pub async fn spawn() -> (Arc<Self>, String) {
        let master = Arc::new(Self::default());
        let app = Router::new()
            .route("/api/workspace/running", get(running))
            .route("/api/workspace/{id}", get(workspace))
            .route("/api/workspace/{id}/stop", post(stop))
            .with_state(master.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake master");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (master, format!("http://{}", addr))
    }

    pub fn add_running(&self, workspace_id: &str, created: Option<&str>) {
        let mut attributes = HashMap::new();
        if let Some(created) = created {
            attributes.insert("created".to_string(), created.to_string());
        }
        self.attributes
            .lock()
            .unwrap()
            .insert(workspace_id.to_string(), attributes);
        self.running.lock().unwrap().insert(workspace_id.to_string());
    }

    /// Make every endpoint answer 503.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }

    pub fn is_running(&self, workspace_id: &str) -> bool {
        self.running.lock().unwrap().contains(workspace_id)
    }

    fn check_available(&self) -> Result<(), StatusCode> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Ok(())
    }
}

async fn running(State(master): State<Arc<FakeMaster>>) -> Result<Json<Vec<String>>, StatusCode> {
    master.check_available()?;
    let mut ids: Vec<String> = master.running.lock().unwrap().iter().cloned().collect();
    ids.sort();
    Ok(Json(ids))
}

async fn workspace(
    State(master): State<Arc<FakeMaster>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    master.check_available()?;
    let attributes = master
        .attributes
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "id": id, "attributes": attributes })))
}

async fn stop(
    State(master): State<Arc<FakeMaster>>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    master.check_available()?;
    if !master.running.lock().unwrap().remove(&id) {
        return Err(StatusCode::CONFLICT);
    }
    master.stopped.lock().unwrap().push(id);
    Ok(StatusCode::NO_CONTENT)
}
