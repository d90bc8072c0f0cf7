//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use keliling_api::AppState;
use keliling_api::router::build_router;
use keliling_auth::{JwtDecoder, JwtEncoder};
use keliling_core::config::AppConfig;
use keliling_core::error::{AppError, ErrorKind};
use keliling_core::result::AppResult;
use keliling_core::types::{UserId, VendorId};
use keliling_database::VendorStore;
use keliling_database::memory::MemoryVendorStore;
use keliling_entity::vendor::{CreateVendor, Vendor};
use keliling_realtime::MemoryChangeFeed;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state (services, feed)
    pub state: AppState,
    /// The in-memory store behind the router
    pub store: Arc<MemoryVendorStore>,
    /// Token minting for callers
    pub encoder: JwtEncoder,
    /// Application config
    pub config: AppConfig,
}

/// A decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.rate_limit.enabled = false;
    config
}

impl TestApp {
    /// Create a new test application backed by an empty in-memory store
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryVendorStore::new());
        Self::build(config, store.clone(), store)
    }

    /// Create a test application whose store fails as configured
    pub fn with_failing_store(fail_reads: bool, fail_writes: bool) -> Self {
        let store = Arc::new(MemoryVendorStore::new());
        let failing = Arc::new(FailingStore {
            inner: (*store).clone(),
            fail_reads,
            fail_writes,
        });
        Self::build(test_config(), store, failing)
    }

    fn build(config: AppConfig, store: Arc<MemoryVendorStore>, backend: Arc<dyn VendorStore>) -> Self {
        let verifier = Arc::new(JwtDecoder::new(&config.auth));
        let feed = Arc::new(MemoryChangeFeed::new(16));
        let state = AppState::new(config.clone(), verifier, backend, feed);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            store,
            encoder: JwtEncoder::new(&config.auth),
            config,
        }
    }

    /// Access token for `user`
    pub fn token_for(&self, user: UserId) -> String {
        self.encoder
            .issue(user, Some("authenticated"), None)
            .expect("Failed to issue token")
            .0
    }

    /// Insert a vendor owned by `owner`
    pub async fn seed_vendor(&self, owner: UserId, online: bool) -> VendorId {
        self.store
            .insert(CreateVendor {
                owner_id: owner,
                name: "Martabak Manis".to_string(),
                description: Some("Keju coklat".to_string()),
                photo_url: None,
                location: Some(serde_json::json!({ "lat": -6.2, "lng": 106.8 })),
                online,
            })
            .await
            .expect("Failed to seed vendor")
            .id
    }

    /// Stored presence flag
    pub async fn stored_online(&self, id: VendorId) -> bool {
        self.store
            .find_by_id(id)
            .await
            .expect("read")
            .expect("vendor exists")
            .online
    }

    /// POST a presence update with a raw body and optional bearer token
    pub async fn post_online(&self, path: &str, body: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// POST a toggle as if from `peer`, optionally with an `X-Forwarded-For` header
    pub async fn post_online_from(
        &self,
        path: &str,
        token: &str,
        peer: SocketAddr,
        forwarded: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("authorization", format!("Bearer {token}"));
        if let Some(forwarded) = forwarded {
            builder = builder.header("x-forwarded-for", forwarded);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        self.send(req).await
    }

    /// GET a path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
    }

    /// Send an arbitrary request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }
}

/// Wraps a memory store and fails reads and/or writes.
#[derive(Debug)]
pub struct FailingStore {
    inner: MemoryVendorStore,
    fail_reads: bool,
    fail_writes: bool,
}

#[async_trait]
impl VendorStore for FailingStore {
    async fn find_by_id(&self, id: VendorId) -> AppResult<Option<Vendor>> {
        if self.fail_reads {
            return Err(AppError::with_source(
                ErrorKind::Transient,
                "Failed to read vendor",
                std::io::Error::other("connection reset"),
            ));
        }
        self.inner.find_by_id(id).await
    }

    async fn set_online(&self, id: VendorId, online: bool) -> AppResult<Option<Vendor>> {
        if self.fail_writes {
            return Err(AppError::transient("Failed to update vendor status"));
        }
        self.inner.set_online(id, online).await
    }

    async fn list(&self) -> AppResult<Vec<Vendor>> {
        if self.fail_reads {
            return Err(AppError::transient("Failed to list vendors"));
        }
        self.inner.list().await
    }

    async fn insert(&self, data: CreateVendor) -> AppResult<Vendor> {
        self.inner.insert(data).await
    }
}
