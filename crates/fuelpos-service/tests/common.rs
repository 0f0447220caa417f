//! Common test utilities for fuelpos integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use tempfile::TempDir;

use fuelpos_service::auth::SessionClaims;
use fuelpos_service::{create_router, AppState, ServiceConfig};
use fuelpos_store::RocksStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The admin API key accepted by the server.
    pub admin_key: String,
    /// The HS256 secret session tokens are signed with.
    pub jwt_secret: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let admin_key = "test-admin-key".to_string();
        let jwt_secret = "test-jwt-secret".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            admin_api_key: Some(admin_key.clone()),
            jwt_secret: Some(jwt_secret.clone()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            lock_timeout_ms: 2000,
        };

        let store = RocksStore::open_with(temp_dir.path(), config.store_options())
            .expect("Failed to open store");

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            admin_key,
            jwt_secret,
        }
    }

    /// A signed session token for `sub` with the given role.
    pub fn bearer(&self, sub: &str, role: &str) -> String {
        let claims = SessionClaims {
            sub: sub.into(),
            role: role.into(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .expect("Failed to sign token");
        format!("Bearer {token}")
    }

    /// Add a fuel type and return its id.
    pub async fn create_fuel(&self, fuel_type: &str, price: &str, stock: &str) -> u64 {
        let response = self
            .server
            .post("/v1/fuel")
            .add_header("x-admin-key", &self.admin_key)
            .json(&json!({
                "type": fuel_type,
                "price_per_unit": price,
                "stock_quantity": stock
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        body["id"].as_u64().expect("fuel id")
    }

    /// Current stock of a fuel, as returned by the API.
    pub async fn stock_of(&self, fuel_id: u64) -> String {
        let response = self
            .server
            .get(&format!("/v1/fuel/{fuel_id}"))
            .add_header("x-admin-key", &self.admin_key)
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["stock_quantity"]
            .as_str()
            .expect("stock as string")
            .to_string()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
