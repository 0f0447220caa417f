//! Sale recording integration tests.

mod common;

use std::future::IntoFuture;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

async fn sell(harness: &TestHarness, fuel_id: u64, quantity: &str) -> axum_test::TestResponse {
    harness
        .server
        .post("/v1/sales")
        .add_header("x-admin-key", &harness.admin_key)
        .add_header("x-admin-id", "attendant-1")
        .json(&json!({
            "fuel_id": fuel_id,
            "quantity": quantity,
            "customer_name": "  Ravi  "
        }))
        .await
}

// ============================================================================
// Record Sale
// ============================================================================

#[tokio::test]
async fn sale_within_stock_returns_receipt() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("Petrol", "100.00", "100.00").await;

    let response = sell(&harness, fuel_id, "30.00").await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_amount"], "3000.00");
    assert_eq!(body["price_per_unit"], "100.00");
    assert!(body["sale_id"].as_str().is_some());

    assert_eq!(harness.stock_of(fuel_id).await, "70.00");
}

#[tokio::test]
async fn sale_beyond_stock_is_a_conflict() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("Petrol", "100.00", "100.00").await;

    let response = sell(&harness, fuel_id, "150.00").await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_stock");
    assert_eq!(body["error"]["details"]["fuel_id"], fuel_id);
    assert_eq!(body["error"]["details"]["requested"], "150.00");
    assert_eq!(body["error"]["details"]["available"], "100.00");

    assert_eq!(harness.stock_of(fuel_id).await, "100.00");
}

#[tokio::test]
async fn sale_of_unknown_fuel_is_not_found() {
    let harness = TestHarness::new();

    let response = sell(&harness, 999, "10.00").await;

    response.assert_status_not_found();

    let listing = harness
        .server
        .get("/v1/sales")
        .add_header("x-admin-key", &harness.admin_key)
        .await;
    let body: Vec<serde_json::Value> = listing.json();
    assert!(body.is_empty());
}

#[tokio::test]
async fn malformed_sales_are_validation_errors() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("Petrol", "100.00", "100.00").await;

    for body in [
        json!({ "fuel_id": fuel_id, "quantity": "0" }),
        json!({ "fuel_id": fuel_id, "quantity": "-5" }),
        json!({ "fuel_id": fuel_id }),
        json!({ "quantity": "5" }),
        json!({ "fuel_id": 0, "quantity": "5" }),
        json!({ "fuel_id": fuel_id, "quantity": "lots" }),
    ] {
        let response = harness
            .server
            .post("/v1/sales")
            .add_header("x-admin-key", &harness.admin_key)
            .json(&body)
            .await;

        response.assert_status_bad_request();
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"]["code"], "validation_error");
    }

    assert_eq!(harness.stock_of(fuel_id).await, "100.00");
}

#[tokio::test]
async fn sale_requires_credentials() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("Petrol", "100.00", "100.00").await;

    harness
        .server
        .post("/v1/sales")
        .json(&json!({ "fuel_id": fuel_id, "quantity": "1" }))
        .await
        .assert_status_unauthorized();

    assert_eq!(harness.stock_of(fuel_id).await, "100.00");
}

#[tokio::test]
async fn sale_with_session_token() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("Diesel", "90.00", "50.00").await;

    let response = harness
        .server
        .post("/v1/sales")
        .add_header("authorization", harness.bearer("manager", "admin"))
        .json(&json!({ "fuel_id": fuel_id, "quantity": 2.5 }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_amount"], "225.00");
}

#[tokio::test]
async fn concurrent_sales_never_oversell() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("Petrol", "100.00", "100.00").await;

    let requests = (0..10).map(|_| {
        harness
            .server
            .post("/v1/sales")
            .add_header("x-admin-key", &harness.admin_key)
            .json(&json!({ "fuel_id": fuel_id, "quantity": "30" }))
            .into_future()
    });
    let responses = futures::future::join_all(requests).await;

    let created = responses
        .iter()
        .filter(|r| r.status_code() == StatusCode::CREATED)
        .count();
    let conflicts = responses
        .iter()
        .filter(|r| r.status_code() == StatusCode::CONFLICT)
        .count();

    assert_eq!(created, 3);
    assert_eq!(conflicts, 7);
    assert_eq!(harness.stock_of(fuel_id).await, "10.00");
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn recent_sales_are_newest_first_with_labels() {
    let harness = TestHarness::new();
    let petrol = harness.create_fuel("Petrol", "100.00", "100.00").await;
    let diesel = harness.create_fuel("Diesel", "90.00", "100.00").await;

    sell(&harness, petrol, "1.00").await.assert_status(StatusCode::CREATED);
    sell(&harness, diesel, "2.00").await.assert_status(StatusCode::CREATED);

    let response = harness
        .server
        .get("/v1/sales")
        .add_header("x-admin-key", &harness.admin_key)
        .await;

    response.assert_status_ok();
    let body: Vec<serde_json::Value> = response.json();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0]["fuel_type"], "Diesel");
    assert_eq!(body[0]["total_amount"], "180.00");
    assert_eq!(body[0]["customer_name"], "Ravi");
    assert_eq!(body[1]["fuel_type"], "Petrol");
}

#[tokio::test]
async fn recent_sales_respect_limit() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("Petrol", "100.00", "100.00").await;
    for _ in 0..3 {
        sell(&harness, fuel_id, "1").await.assert_status(StatusCode::CREATED);
    }

    let response = harness
        .server
        .get("/v1/sales?limit=2")
        .add_header("x-admin-key", &harness.admin_key)
        .await;

    response.assert_status_ok();
    let body: Vec<serde_json::Value> = response.json();
    assert_eq!(body.len(), 2);

    harness
        .server
        .get("/v1/sales?limit=many")
        .add_header("x-admin-key", &harness.admin_key)
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn deleted_fuel_sales_are_listed_without_label() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("CNG", "75.00", "100.00").await;
    sell(&harness, fuel_id, "4").await.assert_status(StatusCode::CREATED);

    harness
        .server
        .delete(&format!("/v1/fuel/{fuel_id}"))
        .add_header("x-admin-key", &harness.admin_key)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = harness
        .server
        .get("/v1/sales")
        .add_header("x-admin-key", &harness.admin_key)
        .await;

    let body: Vec<serde_json::Value> = response.json();
    assert_eq!(body.len(), 1);
    assert!(body[0]["fuel_type"].is_null());
    assert_eq!(body[0]["total_amount"], "300.00");
}

#[tokio::test]
async fn get_sale_by_id() {
    let harness = TestHarness::new();
    let fuel_id = harness.create_fuel("Petrol", "96.725", "100").await;

    let receipt: serde_json::Value = sell(&harness, fuel_id, "1").await.json();
    let sale_id = receipt["sale_id"].as_str().unwrap();
    assert_eq!(receipt["total_amount"], "96.73");

    let response = harness
        .server
        .get(&format!("/v1/sales/{sale_id}"))
        .add_header("x-admin-key", &harness.admin_key)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], sale_id);
    assert_eq!(body["fuel_id"], fuel_id);
    assert_eq!(body["price_per_unit"], "96.725");
    assert_eq!(body["customer_name"], "Ravi");
}

#[tokio::test]
async fn get_sale_with_bad_or_unknown_id() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/v1/sales/not-a-ulid")
        .add_header("x-admin-key", &harness.admin_key)
        .await
        .assert_status_bad_request();

    harness
        .server
        .get("/v1/sales/01ARZ3NDEKTSV4RRFFQ69G5FAV")
        .add_header("x-admin-key", &harness.admin_key)
        .await
        .assert_status_not_found();
}
