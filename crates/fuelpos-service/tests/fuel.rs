//! Fuel inventory integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

// ============================================================================
// Create and read
// ============================================================================

#[tokio::test]
async fn create_fuel_returns_record() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/fuel")
        .add_header("x-admin-key", &harness.admin_key)
        .json(&json!({
            "type": "Petrol",
            "price_per_unit": "102.50",
            "stock_quantity": "5000.00"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["type"], "Petrol");
    assert_eq!(body["price_per_unit"], "102.50");
    assert_eq!(body["stock_quantity"], "5000.00");
}

#[tokio::test]
async fn create_fuel_accepts_numeric_amounts() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/fuel")
        .add_header("x-admin-key", &harness.admin_key)
        .json(&json!({
            "type": "Diesel",
            "price_per_unit": 90.5,
            "stock_quantity": 1000
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["price_per_unit"], "90.5");
}

#[tokio::test]
async fn create_fuel_rejects_negative_price() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/fuel")
        .add_header("x-admin-key", &harness.admin_key)
        .json(&json!({
            "type": "Petrol",
            "price_per_unit": "-1",
            "stock_quantity": "10"
        }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn create_fuel_rejects_malformed_body() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/fuel")
        .add_header("x-admin-key", &harness.admin_key)
        .json(&json!({ "type": "Petrol" }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn list_fuels_in_id_order() {
    let harness = TestHarness::new();
    let petrol = harness.create_fuel("Petrol", "100.00", "100.00").await;
    let diesel = harness.create_fuel("Diesel", "90.00", "50.00").await;

    let response = harness
        .server
        .get("/v1/fuel")
        .add_header("x-admin-key", &harness.admin_key)
        .await;

    response.assert_status_ok();
    let body: Vec<serde_json::Value> = response.json();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0]["id"], petrol);
    assert_eq!(body[1]["id"], diesel);
    assert_eq!(body[1]["type"], "Diesel");
}

#[tokio::test]
async fn get_unknown_fuel_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/fuel/42")
        .add_header("x-admin-key", &harness.admin_key)
        .await;

    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn non_positive_fuel_id_is_a_validation_error() {
    let harness = TestHarness::new();

    for path in ["/v1/fuel/0", "/v1/fuel/-3", "/v1/fuel/abc"] {
        let response = harness
            .server
            .get(path)
            .add_header("x-admin-key", &harness.admin_key)
            .await;

        response.assert_status_bad_request();
    }
}

// ============================================================================
// Update and delete
// ============================================================================

#[tokio::test]
async fn update_price_only_keeps_stock() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("Petrol", "100.00", "100.00").await;

    let response = harness
        .server
        .put(&format!("/v1/fuel/{fuel_id}"))
        .add_header("x-admin-key", &harness.admin_key)
        .json(&json!({ "price_per_unit": "105.25" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["price_per_unit"], "105.25");
    assert_eq!(body["stock_quantity"], "100.00");
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("Petrol", "100.00", "100.00").await;

    let response = harness
        .server
        .put(&format!("/v1/fuel/{fuel_id}"))
        .add_header("x-admin-key", &harness.admin_key)
        .json(&json!({}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn update_unknown_fuel_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .put("/v1/fuel/9")
        .add_header("x-admin-key", &harness.admin_key)
        .json(&json!({ "stock_quantity": "10" }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn delete_fuel_then_get_is_not_found() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("CNG", "75.00", "300.00").await;

    harness
        .server
        .delete(&format!("/v1/fuel/{fuel_id}"))
        .add_header("x-admin-key", &harness.admin_key)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    harness
        .server
        .get(&format!("/v1/fuel/{fuel_id}"))
        .add_header("x-admin-key", &harness.admin_key)
        .await
        .assert_status_not_found();

    harness
        .server
        .delete(&format!("/v1/fuel/{fuel_id}"))
        .add_header("x-admin-key", &harness.admin_key)
        .await
        .assert_status_not_found();
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn fuel_routes_require_credentials() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/fuel").await;

    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn wrong_admin_key_is_rejected() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/v1/fuel")
        .add_header("x-admin-key", "not-the-key")
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn admin_session_token_is_accepted() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/v1/fuel")
        .add_header("authorization", harness.bearer("manager", "admin"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn non_admin_session_token_is_rejected() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/v1/fuel")
        .add_header("authorization", harness.bearer("cashier", "employee"))
        .await
        .assert_status_unauthorized();
}
