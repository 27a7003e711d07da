//! Notification Model
//!
//! Notifications as the panels hold them, plus the decoder that maps every
//! backend variant onto that one shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use super::decode::{first_bool, first_datetime, id_of, list_items, str_or};
use super::role::Role;
use crate::error::{ClientError, ClientResult};

pub const DEFAULT_TITLE: &str = "Notification";
pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_TYPE: &str = "general";

/// Notification priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// Notification in its normalized form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub category: String,
    pub priority: Priority,
    pub created_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Decode one backend item.
    ///
    /// Fallbacks: `title ?? subject ?? "Notification"`, `message ?? content ??
    /// body ?? ""`. `read_at` is used as is; without it, `is_read: true`
    /// becomes `read_at = created_at ?? received_at` and anything else stays
    /// unread. Items without an id are dropped.
    pub fn from_value(item: &Value, received_at: DateTime<Utc>) -> Option<Self> {
        let id = id_of(item, &["id", "notification_id"])?;
        let created_at = first_datetime(item, &["created_at", "timestamp", "date"]);

        let read_at = match item.get("read_at") {
            Some(Value::String(raw)) => super::decode::parse_datetime(raw),
            _ => match first_bool(item, &["is_read", "read"]) {
                Some(true) => Some(created_at.unwrap_or(received_at)),
                _ => None,
            },
        };

        let priority = item
            .get("priority")
            .and_then(Value::as_str)
            .and_then(|p| p.parse().ok())
            .unwrap_or_default();

        Some(Self {
            id,
            kind: str_or(item, &["type", "notification_type"], DEFAULT_TYPE),
            title: str_or(item, &["title", "subject"], DEFAULT_TITLE),
            message: str_or(item, &["message", "content", "body"], ""),
            category: str_or(item, &["category"], DEFAULT_CATEGORY),
            priority,
            created_at,
            read_at,
        })
    }

    /// Decode a list response: `{notifications: [...]}`, `{data: [...]}` or a bare array
    pub fn list_from_value(payload: &Value, received_at: DateTime<Utc>) -> Vec<Self> {
        list_items(payload, "notifications")
            .iter()
            .filter_map(|item| Self::from_value(item, received_at))
            .collect()
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

/// Who a sent notification goes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "target", content = "value")]
pub enum Audience {
    Everyone,
    Role(Role),
    Users(Vec<String>),
}

/// Body of `POST /notifications/send`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    pub category: String,
    pub priority: Priority,
    pub audience: Audience,
}

impl NotificationDraft {
    pub fn new(title: &str, message: &str, audience: Audience) -> Self {
        Self {
            title: title.trim().to_string(),
            message: message.trim().to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            priority: Priority::Normal,
            audience,
        }
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.title.trim().is_empty() {
            return Err(ClientError::validation("Please enter a notification title"));
        }
        if self.message.trim().is_empty() {
            return Err(ClientError::validation("Please enter a notification message"));
        }
        if matches!(&self.audience, Audience::Users(ids) if ids.is_empty()) {
            return Err(ClientError::validation("Please choose at least one recipient"));
        }
        Ok(())
    }
}
