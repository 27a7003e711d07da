//! AI tutor webhook and chat tests

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use school_portal_client::api::TutorRequest;
use school_portal_client::error::GENERIC_APOLOGY;
use school_portal_client::models::Role;
use school_portal_client::panels::tutor_chat::LessonSettings;
use school_portal_client::panels::{Speaker, TutorChat};
use school_portal_client::TutorClient;

use super::support::{clock, context, MockBackend};

fn tutor(base: &str) -> TutorClient {
    TutorClient::with_webhook(format!("{base}/tutor").parse().unwrap(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_webhook_payload_shape() {
    let mock = MockBackend::new();
    mock.on("POST", "/tutor", 200, json!({"output": "Bonjour means hello."}));
    let base = mock.start().await;

    let request = TutorRequest {
        user_role: Role::Student,
        language: "French".into(),
        level: "beginner".into(),
        topic: "greetings".into(),
        lesson_type: "vocabulary".into(),
        student_id: "9".into(),
        message: "What does bonjour mean?".into(),
    };
    let reply = tutor(&base).ask(&request).await.unwrap();
    assert_eq!(reply, "Bonjour means hello.");

    let recorded = &mock.requests_to("POST", "/tutor")[0];
    assert!(recorded.authorization.is_none());
    assert_eq!(
        recorded.body,
        json!({
            "userRole": "student",
            "language": "French",
            "level": "beginner",
            "topic": "greetings",
            "lessonType": "vocabulary",
            "studentId": "9",
            "message": "What does bonjour mean?"
        })
    );
}

#[tokio::test]
async fn test_chat_appends_both_turns() {
    let mock = MockBackend::new();
    mock.on("POST", "/tutor", 200, json!([{"response": "Photosynthesis turns light into sugar."}]));
    let base = mock.start().await;

    let chat = TutorChat::new(context(&base, Role::Student, "9", &clock()), tutor(&base));
    chat.mount();
    chat.configure(LessonSettings {
        topic: "biology".into(),
        ..LessonSettings::default()
    })
    .await;

    chat.ask("What is photosynthesis?").await.unwrap();

    let turns = chat.transcript().await;
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].speaker, Speaker::User);
    assert_eq!(turns[1].speaker, Speaker::Tutor);
    assert_eq!(turns[1].text, "Photosynthesis turns light into sugar.");
    assert_eq!(mock.requests_to("POST", "/tutor")[0].body["topic"], "biology");
}

#[tokio::test]
async fn test_chat_failure_appends_apology_and_alerts() {
    let mock = MockBackend::new();
    mock.on("POST", "/tutor", 500, json!({"error": "model overloaded"}));
    let base = mock.start().await;

    let chat = TutorChat::new(context(&base, Role::Parent, "7", &clock()), tutor(&base));
    chat.mount();

    assert!(chat.ask("Help with fractions").await.is_err());

    let turns = chat.transcript().await;
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].text, "Help with fractions");
    assert_eq!(turns[1].speaker, Speaker::Tutor);
    assert_eq!(turns[1].text, GENERIC_APOLOGY);
    assert_eq!(chat.take_alert().unwrap().message, GENERIC_APOLOGY);
}

#[tokio::test]
async fn test_reply_without_text_shows_apology() {
    let mock = MockBackend::new();
    mock.on("POST", "/tutor", 200, json!({"status": "ok"}));
    let base = mock.start().await;

    let chat = TutorChat::new(context(&base, Role::Student, "9", &clock()), tutor(&base));
    chat.mount();

    let error = chat.ask("Explain gravity").await.unwrap_err();
    assert_eq!(error.error_code(), "EmptyReply");

    let turns = chat.transcript().await;
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].text, GENERIC_APOLOGY);
    let alert = chat.take_alert().unwrap();
    assert_eq!(alert.message, GENERIC_APOLOGY);
}

#[tokio::test]
async fn test_unmount_drops_pending_reply() {
    let mock = MockBackend::new();
    mock.on_delayed("POST", "/tutor", json!({"output": "late"}), Duration::from_millis(300));
    let base = mock.start().await;

    let chat = Arc::new(TutorChat::new(context(&base, Role::Student, "9", &clock()), tutor(&base)));
    chat.mount();

    let asking = chat.clone();
    let pending = tokio::spawn(async move { asking.ask("Are you there?").await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    chat.unmount();

    let result = pending.await.unwrap();
    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(chat.transcript().await.len(), 1);
    assert!(chat.take_alert().is_none());
}
