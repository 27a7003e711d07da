//! HTTP client contract tests

use reqwest::Method;
use serde_json::{json, Value};

use school_portal_client::api::RequestOptions;
use school_portal_client::models::{LeaderboardCategory, LeaderboardPeriod};
use school_portal_client::ClientError;

use super::support::{api, MockBackend, TOKEN};

#[tokio::test]
async fn test_authenticated_get_sends_bearer_and_json_headers() {
    let mock = MockBackend::new();
    mock.on("GET", "/students", 200, json!({"students": [{"id": 1, "name": "Amina"}]}));
    let base = mock.start().await;

    let students = api(&base, Some(TOKEN)).students().await.unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].name, "Amina");

    let recorded = mock.requests_to("GET", "/students");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].authorization.as_deref(), Some("Bearer test-token"));
    assert_eq!(recorded[0].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_error_message_taken_from_body() {
    let mock = MockBackend::new();
    mock.on("GET", "/payments", 403, json!({"message": "Payments are admin only"}));
    let base = mock.start().await;

    let error = api(&base, Some(TOKEN)).payments().await.unwrap_err();
    match error {
        ClientError::Http { status, message } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(message, "Payments are admin only");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_generic_message_without_body_message() {
    let mock = MockBackend::new();
    mock.on("GET", "/attendance", 500, json!({"detail": "boom"}));
    let base = mock.start().await;

    let error = api(&base, Some(TOKEN)).attendance().await.unwrap_err();
    assert_eq!(error.to_string(), "HTTP error: 500");
    assert!(error.is_server_error());
}

#[tokio::test]
async fn test_missing_token_fails_before_any_request() {
    let mock = MockBackend::new();
    mock.on("GET", "/students", 200, json!([]));
    let base = mock.start().await;

    let error = api(&base, None).students().await.unwrap_err();
    assert!(matches!(error, ClientError::Unauthenticated));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_health_is_unauthenticated() {
    let mock = MockBackend::new();
    mock.on("GET", "/health", 200, json!({"status": "ok"}));
    let base = mock.start().await;

    let health = api(&base, None).health().await.unwrap();
    assert_eq!(health["status"], "ok");
    assert!(mock.requests_to("GET", "/health")[0].authorization.is_none());
}

#[tokio::test]
async fn test_caller_headers_override_defaults() {
    let mock = MockBackend::new();
    mock.on("POST", "/messaging/send", 200, json!({"id": 9}));
    let base = mock.start().await;

    let options = RequestOptions::new(Method::POST)
        .with_body(&json!({"content": "hi", "recipient_id": "2"}))
        .unwrap()
        .with_header("Content-Type", "application/vnd.portal+json")
        .authenticated();
    let reply: Value = api(&base, Some(TOKEN)).request("/messaging/send", options).await.unwrap();
    assert_eq!(reply["id"], 9);

    let recorded = &mock.requests_to("POST", "/messaging/send")[0];
    assert_eq!(recorded.content_type.as_deref(), Some("application/vnd.portal+json"));
    assert_eq!(recorded.body["content"], "hi");
}

#[tokio::test]
async fn test_empty_success_body_is_accepted() {
    let mock = MockBackend::new();
    mock.on_raw("DELETE", "/payment-plans/7", 200, "", std::time::Duration::ZERO);
    let base = mock.start().await;

    api(&base, Some(TOKEN)).delete_payment_plan("7").await.unwrap();
    assert_eq!(mock.requests_to("DELETE", "/payment-plans/7").len(), 1);
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let mock = MockBackend::new();
    mock.on_raw("GET", "/fee-structure", 200, "<html>oops</html>", std::time::Duration::ZERO);
    let base = mock.start().await;

    let error = api(&base, Some(TOKEN)).fee_structure().await.unwrap_err();
    assert!(matches!(error, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_leaderboard_query_and_fallbacks() {
    let mock = MockBackend::new();
    mock.on(
        "GET",
        "/leaderboard",
        200,
        json!({"leaderboard": [
            {"student_id": 4, "student_name": "Okello", "score": 90},
            {"student_id": 5, "name": "Nakato"}
        ]}),
    );
    let base = mock.start().await;

    let entries = api(&base, Some(TOKEN))
        .leaderboard(LeaderboardPeriod::Weekly, LeaderboardCategory::Academic)
        .await
        .unwrap();

    assert_eq!(entries[0].name, "Okello");
    assert_eq!(entries[0].points, 90);
    assert_eq!(entries[0].rank, 1);
    assert_eq!(entries[1].points, 0);
    assert_eq!(entries[1].rank, 2);

    let recorded = &mock.requests_to("GET", "/leaderboard")[0];
    assert_eq!(recorded.query.as_deref(), Some("period=weekly&category=academic"));
}

#[tokio::test]
async fn test_mark_read_posts_to_item_path() {
    let mock = MockBackend::new();
    mock.on("POST", "/notifications/12/read", 200, json!({"success": true}));
    let base = mock.start().await;

    api(&base, Some(TOKEN)).mark_notification_read("12").await.unwrap();
    let recorded = &mock.requests_to("POST", "/notifications/12/read")[0];
    assert_eq!(recorded.body, json!({}));
}
