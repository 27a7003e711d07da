//! Messaging panel tests

use std::time::Duration;

use serde_json::json;

use school_portal_client::models::{DeliveryStatus, GroupDraft, Role};
use school_portal_client::panels::{Conversation, MessagingPanel};
use school_portal_client::view::LoadOutcome;

use super::support::{clock, context, MockBackend};

fn directory(mock: &MockBackend) {
    mock.on(
        "GET",
        "/messaging/contacts",
        200,
        json!({"contacts": [
            {"id": 2, "full_name": "Mr. Ssali", "is_online": true, "unread_count": 3},
            {"id": 5}
        ]}),
    );
    mock.on("GET", "/messaging/groups", 200, json!({"groups": [{"id": 8, "name": "P6 Parents", "members": [1, 2, 3]}]}));
}

#[tokio::test]
async fn test_directory_loads_contacts_and_groups() {
    let mock = MockBackend::new();
    directory(&mock);
    let base = mock.start().await;

    let panel = MessagingPanel::new(context(&base, Role::Parent, "7", &clock()));
    assert_eq!(panel.mount().await, LoadOutcome::Loaded);

    let contacts = panel.contacts().await;
    assert_eq!(contacts[0].name, "Mr. Ssali");
    assert!(contacts[0].online);
    assert_eq!(contacts[0].unread, 3);
    assert_eq!(contacts[1].name, "Unknown");
    assert_eq!(panel.groups().await[0].member_count, 3);
    panel.unmount();
}

#[tokio::test]
async fn test_selecting_contact_clears_unread() {
    let mock = MockBackend::new();
    directory(&mock);
    let base = mock.start().await;

    let panel = MessagingPanel::new(context(&base, Role::Parent, "7", &clock()));
    panel.mount().await;
    panel.select(Conversation::Contact("2".into())).await;

    assert_eq!(panel.contacts().await[0].unread, 0);
    assert_eq!(panel.selected().await, Some(Conversation::Contact("2".into())));
    panel.unmount();
}

#[tokio::test]
async fn test_optimistic_send_succeeds() {
    let mock = MockBackend::new();
    directory(&mock);
    mock.on("POST", "/messaging/send", 200, json!({"message": {"id": 44}}));
    let base = mock.start().await;

    let panel = MessagingPanel::new(context(&base, Role::Parent, "7", &clock()));
    panel.mount().await;
    let chat = Conversation::Contact("2".into());
    panel.select(chat.clone()).await;

    let local_id = panel.send_message("  Good morning  ").await.unwrap();
    let transcript = panel.transcript(&chat).await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].local_id, local_id);
    assert_eq!(transcript[0].content, "Good morning");
    assert_eq!(transcript[0].status, DeliveryStatus::Sent);
    assert_eq!(transcript[0].server_id.as_deref(), Some("44"));

    let sent = &mock.requests_to("POST", "/messaging/send")[0];
    assert_eq!(sent.body, json!({"recipient_id": "2", "content": "Good morning"}));
    panel.unmount();
}

#[tokio::test]
async fn test_message_is_visible_as_sent_before_the_reply() {
    let mock = MockBackend::new();
    directory(&mock);
    mock.on_delayed("POST", "/messaging/send", json!({"id": 1}), Duration::from_millis(300));
    let base = mock.start().await;

    let panel = MessagingPanel::new(context(&base, Role::Teacher, "3", &clock()));
    panel.mount().await;
    let chat = Conversation::Group("8".into());
    panel.select(chat.clone()).await;

    let sender = panel.clone();
    let pending = tokio::spawn(async move { sender.send_message("Reminder: trip tomorrow").await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let transcript = panel.transcript(&chat).await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].status, DeliveryStatus::Sent);

    pending.await.unwrap().unwrap();
    panel.unmount();
}

#[tokio::test]
async fn test_failed_send_stays_in_transcript() {
    let mock = MockBackend::new();
    directory(&mock);
    mock.on("POST", "/messaging/send", 500, json!({"message": "queue full"}));
    let base = mock.start().await;

    let panel = MessagingPanel::new(context(&base, Role::Parent, "7", &clock()));
    panel.mount().await;
    let chat = Conversation::Contact("2".into());
    panel.select(chat.clone()).await;

    let result = panel.send_message("Is the bus late?").await;
    assert!(result.is_err());

    let transcript = panel.transcript(&chat).await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].content, "Is the bus late?");
    assert_eq!(transcript[0].status, DeliveryStatus::Failed);

    // Failed chat sends are marked inline, not alerted
    assert!(panel.take_alert().is_none());
    panel.unmount();
}

#[tokio::test]
async fn test_retry_failed_resends() {
    let mock = MockBackend::new();
    directory(&mock);
    mock.on("POST", "/messaging/send", 503, json!({}));
    let base = mock.start().await;

    let panel = MessagingPanel::new(context(&base, Role::Parent, "7", &clock()));
    panel.mount().await;
    let chat = Conversation::Contact("5".into());
    panel.select(chat.clone()).await;
    let _ = panel.send_message("hello").await;

    mock.on("POST", "/messaging/send", 200, json!({"id": 70}));
    assert_eq!(panel.retry_failed(&chat).await, 1);

    let transcript = panel.transcript(&chat).await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].status, DeliveryStatus::Sent);
    assert_eq!(mock.requests_to("POST", "/messaging/send").len(), 2);
    panel.unmount();
}

#[tokio::test]
async fn test_empty_message_alerts_without_sending() {
    let mock = MockBackend::new();
    directory(&mock);
    let base = mock.start().await;

    let panel = MessagingPanel::new(context(&base, Role::Parent, "7", &clock()));
    panel.mount().await;
    panel.select(Conversation::Contact("2".into())).await;

    assert!(panel.send_message("   ").await.is_err());
    assert_eq!(panel.take_alert().unwrap().message, "Please type a message");
    assert!(panel.transcript(&Conversation::Contact("2".into())).await.is_empty());
    assert!(mock.requests_to("POST", "/messaging/send").is_empty());
    panel.unmount();
}

#[tokio::test]
async fn test_create_group_is_staff_only() {
    let mock = MockBackend::new();
    directory(&mock);
    mock.on("POST", "/messaging/groups", 200, json!({"group": {"id": 9, "name": "Choir"}}));
    let base = mock.start().await;

    let draft = GroupDraft {
        name: "Choir".into(),
        description: None,
        member_ids: vec!["2".into(), "5".into()],
    };

    let parent = MessagingPanel::new(context(&base, Role::Parent, "7", &clock()));
    parent.mount().await;
    assert!(parent.create_group(&draft).await.is_err());
    assert_eq!(parent.take_alert().unwrap().error_code, "Forbidden");
    parent.unmount();

    let teacher = MessagingPanel::new(context(&base, Role::Teacher, "3", &clock()));
    teacher.mount().await;
    let created = teacher.create_group(&draft).await.unwrap().unwrap();
    assert_eq!(created.name, "Choir");
    assert_eq!(mock.requests_to("POST", "/messaging/groups").len(), 1);
    teacher.unmount();
}

#[tokio::test]
async fn test_unmount_stops_presence_refresh() {
    let mock = MockBackend::new();
    directory(&mock);
    let base = mock.start().await;

    let ctx = context(&base, Role::Parent, "7", &clock()).with_poll_interval(Duration::from_millis(20));
    let panel = MessagingPanel::new(ctx);
    panel.mount().await;
    tokio::time::sleep(Duration::from_millis(70)).await;
    panel.unmount();

    let before = panel.contacts().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(panel.contacts().await, before);
}
