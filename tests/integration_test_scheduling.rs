mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn schedule(app: &TestApp, customer_id: &str, datetime: &str, force: bool) -> (StatusCode, Value) {
    app.send("POST", "/api/v1/appointments", Some(json!({
        "customerId": customer_id,
        "datetime": datetime,
        "force": force,
    }))).await
}

#[tokio::test]
async fn test_conflict_check_reports_both_nearby_appointments() {
    let app = TestApp::new().await;
    app.register("trainer1", "pass1234").await;

    let alice = app.create_customer("Alice").await;
    let bob = app.create_customer("Bob").await;

    let (status, first) = schedule(&app, &alice, "2024-03-01T10:00", false).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["sessionNumber"], 1);

    // 15 minutes later collides; forcing it through still stores it.
    let (status, body) = schedule(&app, &bob, "2024-03-01T10:15", false).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["conflicts"][0]["customerName"], "Alice");

    let (status, _) = schedule(&app, &bob, "2024-03-01T10:15", true).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, conflicts) = app.send("GET", "/api/v1/appointments/conflicts?datetime=2024-03-01T10:00", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = conflicts.as_array().unwrap().iter()
        .map(|c| c["customerName"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Alice"));
    assert!(names.contains(&"Bob"));
}

#[tokio::test]
async fn test_exactly_one_hour_apart_is_not_a_conflict() {
    let app = TestApp::new().await;
    app.register("trainer1", "pass1234").await;
    let alice = app.create_customer("Alice").await;

    schedule(&app, &alice, "2024-03-01T10:00:00Z", false).await;

    let (status, _) = schedule(&app, &alice, "2024-03-01T11:00:00Z", false).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = schedule(&app, &alice, "2024-03-01T09:00:01Z", false).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rescheduling_ignores_the_appointment_itself() {
    let app = TestApp::new().await;
    app.register("trainer1", "pass1234").await;
    let alice = app.create_customer("Alice").await;

    let (_, created) = schedule(&app, &alice, "2024-03-01T10:00", false).await;
    let id = created["id"].as_str().unwrap();

    let (status, conflicts) = app.send("GET",
        &format!("/api/v1/appointments/conflicts?datetime=2024-03-01T10:30&exclude={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(conflicts.as_array().unwrap().is_empty());

    let (status, updated) = app.send("PUT", &format!("/api/v1/appointments/{}", id), Some(json!({
        "datetime": "2024-03-01T10:30",
        "sessionNumber": 2,
        "notes": "  moved  ",
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["datetime"], "2024-03-01T10:30:00Z");
    assert_eq!(updated["sessionNumber"], 2);
    assert_eq!(updated["notes"], "moved");
}

#[tokio::test]
async fn test_session_number_must_be_in_bundle_range() {
    let app = TestApp::new().await;
    app.register("trainer1", "pass1234").await;
    let alice = app.create_customer("Alice").await;

    let (status, _) = app.send("POST", "/api/v1/appointments", Some(json!({
        "customerId": alice, "datetime": "2024-03-01T10:00", "sessionNumber": 5,
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send("POST", "/api/v1/appointments", Some(json!({
        "customerId": alice, "datetime": "not a date",
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conflicts_only_consider_own_customers() {
    let app = TestApp::new().await;

    app.register("trainer1", "pass1234").await;
    let alice = app.create_customer("Alice").await;
    schedule(&app, &alice, "2024-03-01T10:00", false).await;

    app.send("POST", "/api/v1/auth/logout", None).await;
    app.register("trainer2", "pass5678").await;
    let carol = app.create_customer("Carol").await;

    let (status, conflicts) = app.send("GET", "/api/v1/appointments/conflicts?datetime=2024-03-01T10:00", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(conflicts.as_array().unwrap().is_empty());

    let (status, _) = schedule(&app, &carol, "2024-03-01T10:00", false).await;
    assert_eq!(status, StatusCode::CREATED);

    // trainer2 cannot book onto trainer1's customer.
    let (status, _) = schedule(&app, &alice, "2024-03-02T10:00", false).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_appointment_frees_the_slot() {
    let app = TestApp::new().await;
    app.register("trainer1", "pass1234").await;
    let alice = app.create_customer("Alice").await;

    let (_, created) = schedule(&app, &alice, "2024-03-01T10:00", false).await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = app.send("DELETE", &format!("/api/v1/appointments/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = schedule(&app, &alice, "2024-03-01T10:30", false).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.send("DELETE", &format!("/api/v1/appointments/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
