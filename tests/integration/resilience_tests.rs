//! Failure fallback and cancellation across panels

use std::time::Duration;

use serde_json::json;

use school_portal_client::models::Role;
use school_portal_client::panels::{AchievementsPanel, MessagingPanel, NotificationCenter, PaymentsPanel};
use school_portal_client::view::{LoadOutcome, Phase};

use super::support::{clock, context, refused_base_url, MockBackend};

/// Non-2xx answers and refused connections must end in the same empty state
async fn assert_empty_state_for(base: &str) {
    let clock = clock();

    let notifications = NotificationCenter::new(context(base, Role::Parent, "7", &clock));
    assert_eq!(notifications.mount().await, LoadOutcome::FellBack);
    let view = notifications.view().await;
    assert_eq!(view.state.phase, Phase::Error);
    assert!(view.state.data.is_empty());

    let messaging = MessagingPanel::new(context(base, Role::Parent, "7", &clock));
    assert_eq!(messaging.mount().await, LoadOutcome::FellBack);
    assert!(messaging.contacts().await.is_empty());
    assert!(messaging.groups().await.is_empty());
    messaging.unmount();

    let payments = PaymentsPanel::new(context(base, Role::Admin, "1", &clock));
    assert_eq!(payments.mount().await, LoadOutcome::FellBack);
    assert_eq!(payments.data().await, Default::default());

    let achievements = AchievementsPanel::new(context(base, Role::Student, "9", &clock));
    let (list, board) = achievements.mount().await;
    assert_eq!((list, board), (LoadOutcome::FellBack, LoadOutcome::FellBack));
    assert!(achievements.achievements().await.is_empty());
    assert!(achievements.leaderboard().await.is_empty());
}

#[tokio::test]
async fn test_non_success_status_renders_empty_state() {
    let mock = MockBackend::new();
    for path in [
        "/notifications/",
        "/messaging/contacts",
        "/messaging/groups",
        "/fee-structure",
        "/payments",
        "/payment-plans",
        "/achievements/student/9",
        "/leaderboard",
    ] {
        mock.on("GET", path, 503, json!({"message": "maintenance"}));
    }
    let base = mock.start().await;

    assert_empty_state_for(&base).await;
}

#[tokio::test]
async fn test_connection_refused_renders_empty_state() {
    let base = refused_base_url().await;
    assert_empty_state_for(&base).await;
}

#[tokio::test]
async fn test_failure_replaces_previous_data() {
    let mock = MockBackend::new();
    mock.on("GET", "/notifications/", 200, json!([{"id": 1, "title": "Hello"}]));
    let base = mock.start().await;

    let center = NotificationCenter::new(context(&base, Role::Parent, "7", &clock()));
    center.mount().await;
    assert_eq!(center.notifications().await.len(), 1);

    mock.on("GET", "/notifications/", 500, json!({}));
    assert_eq!(center.refresh().await, LoadOutcome::FellBack);
    assert!(center.notifications().await.is_empty());
}

#[tokio::test]
async fn test_unmount_mid_fetch_leaves_state_untouched() {
    let mock = MockBackend::new();
    mock.on_delayed("GET", "/notifications/", json!([{"id": 1}]), Duration::from_millis(300));
    let base = mock.start().await;

    let center = NotificationCenter::new(context(&base, Role::Parent, "7", &clock()));
    let mounting = center.clone();
    let pending = tokio::spawn(async move { mounting.mount().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    center.unmount();

    assert_eq!(pending.await.unwrap(), LoadOutcome::Discarded);
    let view = center.view().await;
    assert_eq!(view.state.phase, Phase::Idle);
    assert!(view.state.data.is_empty());
}

#[tokio::test]
async fn test_latest_started_fetch_wins() {
    let mock = MockBackend::new();
    mock.on_delayed(
        "GET",
        "/achievements/student/1",
        json!([{"id": 10, "title": "Slow"}]),
        Duration::from_millis(300),
    );
    mock.on("GET", "/achievements/student/2", 200, json!([{"id": 20, "title": "Fast"}]));
    mock.on("GET", "/leaderboard", 200, json!([]));
    let base = mock.start().await;

    let panel = AchievementsPanel::new(context(&base, Role::Teacher, "3", &clock()));
    panel.mount().await;

    let slow = panel.clone();
    let first = tokio::spawn(async move { slow.select_student("1").await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(panel.select_student("2").await, LoadOutcome::Loaded);
    assert_eq!(first.await.unwrap(), LoadOutcome::Discarded);

    let achievements = panel.achievements().await;
    assert_eq!(achievements.len(), 1);
    assert_eq!(achievements[0].title, "Fast");
}
