//! API integration tests.
//!
//! These run against a live server with seeded data:
//!     cargo run --bin seed && cargo run
//!     cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Helper to log in as the seeded super admin and get a token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@equiptrack.local",
            "password": "admin12345"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["data"]["token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@equiptrack.local",
            "password": "admin12345"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].is_string());
    assert!(body["data"]["user"]["permissions"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@equiptrack.local",
            "password": "wrong-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["email"], "admin@equiptrack.local");
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_request_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/equipment", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_invalid_token_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/equipment", BASE_URL))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_equipment_paginated() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/equipment?page=1&per_page=5", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"].is_array());
    assert_eq!(body["pagination"]["current_page"], 1);
    assert_eq!(body["pagination"]["per_page"], 5);
}

#[tokio::test]
#[ignore]
async fn test_create_equipment_duplicate_serial_conflicts() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let payload = json!({
        "serial_number": "TEST-DUP-0001",
        "brand": "TestBrand"
    });

    let first = client
        .post(format!("{}/equipment", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/equipment", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_invalid_serial_number_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "serial_number": "has spaces in it"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_add_stock_rejects_invalid_serial() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let form = reqwest::multipart::Form::new()
        .text("serial_numbers", "GOOD-0001")
        .text("serial_numbers", "has spaces in it");
    let response = client
        .post(format!("{}/equipment/add-stock", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // An empty batch is rejected too
    let form = reqwest::multipart::Form::new().text("brand", "NoSerials");
    let response = client
        .post(format!("{}/equipment/add-stock", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
}

/// Full lifecycle: request -> approve -> release -> return.
#[tokio::test]
#[ignore]
async fn test_request_approval_release_return_flow() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let auth = format!("Bearer {}", token);

    // Create an employee and an equipment item to work with
    let employee: Value = client
        .post(format!("{}/employees", BASE_URL))
        .header("Authorization", &auth)
        .json(&json!({
            "first_name": "Flow",
            "last_name": "Tester",
            "email": format!("flow-{}@example.com", uuid_suffix()),
            "employee_type": "Regular"
        }))
        .send()
        .await
        .expect("Failed to create employee")
        .json()
        .await
        .expect("Failed to parse employee");
    let employee_id = employee["data"]["id"].as_i64().expect("no employee id");

    let equipment: Value = client
        .post(format!("{}/equipment", BASE_URL))
        .header("Authorization", &auth)
        .json(&json!({
            "serial_number": format!("FLOW-{}", uuid_suffix()),
            "brand": "FlowBrand"
        }))
        .send()
        .await
        .expect("Failed to create equipment")
        .json()
        .await
        .expect("Failed to parse equipment");
    let equipment_id = equipment["data"]["id"].as_i64().expect("no equipment id");

    // File a request
    let request: Value = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", &auth)
        .json(&json!({
            "employee_id": employee_id,
            "equipment_id": equipment_id,
            "request_mode": "on_site",
            "reason": "Integration test flow"
        }))
        .send()
        .await
        .expect("Failed to create request")
        .json()
        .await
        .expect("Failed to parse request");
    let request_id = request["data"]["id"].as_i64().expect("no request id");
    assert_eq!(request["data"]["status"], "pending");

    // Approve it; a pending transaction should be opened
    let approval: Value = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", &auth)
        .json(&json!({ "notes": "approved for testing" }))
        .send()
        .await
        .expect("Failed to approve request")
        .json()
        .await
        .expect("Failed to parse approval");
    assert_eq!(approval["data"]["request"]["status"], "approved");
    assert_eq!(approval["data"]["transaction"]["status"], "pending");
    let transaction_id = approval["data"]["transaction"]["id"]
        .as_i64()
        .expect("no transaction id");

    // A second approval attempt must conflict
    let again = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", &auth)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(again.status(), 409);

    // Release the equipment
    let released: Value = client
        .post(format!("{}/transactions/{}/release", BASE_URL, transaction_id))
        .header("Authorization", &auth)
        .json(&json!({ "condition": "good" }))
        .send()
        .await
        .expect("Failed to release")
        .json()
        .await
        .expect("Failed to parse release");
    assert_eq!(released["data"]["status"], "released");

    // Equipment must now be in use
    let item: Value = client
        .get(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to fetch equipment")
        .json()
        .await
        .expect("Failed to parse equipment");
    assert_eq!(item["data"]["status"], "in_use");

    // Verify the return
    let returned: Value = client
        .post(format!("{}/transactions/{}/return", BASE_URL, transaction_id))
        .header("Authorization", &auth)
        .json(&json!({ "condition": "good" }))
        .send()
        .await
        .expect("Failed to return")
        .json()
        .await
        .expect("Failed to parse return");
    assert_eq!(returned["data"]["status"], "returned");

    // Returning twice must conflict
    let twice = client
        .post(format!("{}/transactions/{}/return", BASE_URL, transaction_id))
        .header("Authorization", &auth)
        .json(&json!({ "condition": "good" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(twice.status(), 409);

    // Equipment is available again
    let item: Value = client
        .get(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to fetch equipment")
        .json()
        .await
        .expect("Failed to parse equipment");
    assert_eq!(item["data"]["status"], "available");
}

#[tokio::test]
#[ignore]
async fn test_reject_requires_reason() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // Rejection without a reason is a validation error even when the
    // request id does not exist; validation runs first
    let response = client
        .post(format!("{}/requests/999999/reject", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reason": "" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_transaction_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/transactions/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let data = &body["data"];
    assert!(data["total"].is_i64());
    let sum = data["pending"].as_i64().unwrap()
        + data["released"].as_i64().unwrap()
        + data["returned"].as_i64().unwrap()
        + data["lost"].as_i64().unwrap()
        + data["damaged"].as_i64().unwrap();
    assert_eq!(data["total"].as_i64().unwrap(), sum);
}

#[tokio::test]
#[ignore]
async fn test_activity_logs_recorded() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // Logging in above wrote an entry; the list must contain it
    let response = client
        .get(format!("{}/activity-logs?days=1", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let logs = body["data"].as_array().expect("data is not an array");
    assert!(logs.iter().any(|l| l["action"] == "User login"));
}

#[tokio::test]
#[ignore]
async fn test_activity_logs_absurd_window_still_lists() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // A window far beyond the int range is clamped, not a server error
    let response = client
        .get(format!("{}/activity-logs?days=99999999999", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_unknown_permission_name_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .put(format!("{}/users/1/permissions", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "permissions": ["definitely_not_a_permission"],
            "use_custom": true
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_default_page_size_matches_reported_pagination() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // No per_page in the query: returned rows and the pagination block
    // must agree on the default
    let response = client
        .get(format!("{}/equipment", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let per_page = body["pagination"]["per_page"]
        .as_i64()
        .expect("missing per_page");
    assert_eq!(per_page, 15);

    let items = body["data"].as_array().expect("data is not an array");
    assert!(items.len() as i64 <= per_page);
}

#[tokio::test]
#[ignore]
async fn test_custom_permissions_replace_and_reset() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let email = format!("perms{}@example.com", uuid_suffix());
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Permission Subject",
            "email": email,
            "password": "password123",
            "role_id": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let user_id = body["data"]["id"].as_i64().expect("missing user id");

    // Fresh user resolves through the employee role
    let body = get_permissions(&client, &token, user_id).await;
    assert_eq!(body["data"]["is_custom"], false);
    let perms = body["data"]["permissions"].as_array().unwrap();
    assert!(perms.iter().any(|p| p == "view_request"));

    // Enabling a custom set replaces the role grants, not unions them
    let response = client
        .put(format!("{}/users/{}/permissions", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "permissions": ["reports"],
            "use_custom": true
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body = get_permissions(&client, &token, user_id).await;
    assert_eq!(body["data"]["is_custom"], true);
    let perms = body["data"]["permissions"].as_array().unwrap();
    assert!(perms.iter().any(|p| p == "reports"));
    assert!(!perms.iter().any(|p| p == "view_request"));

    // Reset clears the stored set and reverts to the role
    let response = client
        .post(format!("{}/users/{}/permissions/reset", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body = get_permissions(&client, &token, user_id).await;
    assert_eq!(body["data"]["is_custom"], false);
    let perms = body["data"]["permissions"].as_array().unwrap();
    assert!(perms.iter().any(|p| p == "view_request"));
    assert!(!perms.iter().any(|p| p == "reports"));
}

#[tokio::test]
#[ignore]
async fn test_employee_with_history_cannot_be_deleted() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let auth = format!("Bearer {}", token);

    let employee: Value = client
        .post(format!("{}/employees", BASE_URL))
        .header("Authorization", &auth)
        .json(&json!({
            "first_name": "Keeps",
            "last_name": "History",
            "email": format!("history-{}@example.com", uuid_suffix()),
            "employee_type": "Regular"
        }))
        .send()
        .await
        .expect("Failed to create employee")
        .json()
        .await
        .expect("Failed to parse employee");
    let employee_id = employee["data"]["id"].as_i64().expect("no employee id");

    let equipment: Value = client
        .post(format!("{}/equipment", BASE_URL))
        .header("Authorization", &auth)
        .json(&json!({
            "serial_number": format!("HIST-{}", uuid_suffix()),
            "brand": "HistBrand"
        }))
        .send()
        .await
        .expect("Failed to create equipment")
        .json()
        .await
        .expect("Failed to parse equipment");
    let equipment_id = equipment["data"]["id"].as_i64().expect("no equipment id");

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", &auth)
        .json(&json!({
            "employee_id": employee_id,
            "equipment_id": equipment_id,
            "request_mode": "on_site",
            "reason": "Blocks deletion"
        }))
        .send()
        .await
        .expect("Failed to create request");
    assert_eq!(response.status(), 201);

    // The pending request references the employee; deletion must conflict
    let response = client
        .delete(format!("{}/employees/{}", BASE_URL, employee_id))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

async fn get_permissions(client: &Client, token: &str, user_id: i64) -> Value {
    let response = client
        .get(format!("{}/users/{}/permissions", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse response")
}

fn uuid_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .subsec_nanos();
    format!("{}{}", std::process::id(), nanos)
}
