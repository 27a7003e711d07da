//! Messaging models: contacts, groups, and chat transcript entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use super::decode::{first_bool, first_datetime, first_i64, first_str, id_of, list_items, str_or};
use super::role::Role;
use crate::error::{ClientError, ClientResult};

/// Longest message body the composer accepts
pub const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub role: Option<Role>,
    pub avatar: Option<String>,
    pub online: bool,
    pub unread: u32,
    pub last_message: Option<String>,
}

impl Contact {
    /// Decode one contact. `name ?? full_name ?? "Unknown"`,
    /// `online ?? is_online ?? false`, `unread ?? unread_count ?? 0`.
    pub fn from_value(item: &Value) -> Option<Self> {
        let id = id_of(item, &["id", "user_id"])?;
        let unread = first_i64(item, &["unread", "unread_count"]).unwrap_or(0);

        Some(Self {
            id,
            name: str_or(item, &["name", "full_name"], "Unknown"),
            role: first_str(item, &["role", "user_role"]).and_then(|r| r.parse().ok()),
            avatar: first_str(item, &["avatar", "avatar_url"]),
            online: first_bool(item, &["online", "is_online"]).unwrap_or(false),
            unread: u32::try_from(unread.max(0)).unwrap_or(u32::MAX),
            last_message: first_str(item, &["last_message", "lastMessage"]),
        })
    }

    pub fn list_from_value(payload: &Value) -> Vec<Self> {
        list_items(payload, "contacts")
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub member_count: u32,
}

impl Group {
    pub fn from_value(item: &Value) -> Option<Self> {
        let id = id_of(item, &["id", "group_id"])?;
        let members = item
            .get("members")
            .and_then(Value::as_array)
            .map(|m| i64::try_from(m.len()).unwrap_or(i64::MAX));
        let member_count = first_i64(item, &["member_count", "members_count"])
            .or(members)
            .unwrap_or(0);

        Some(Self {
            id,
            name: str_or(item, &["name", "title"], "Untitled group"),
            description: first_str(item, &["description"]),
            member_count: u32::try_from(member_count.max(0)).unwrap_or(u32::MAX),
        })
    }

    pub fn list_from_value(payload: &Value) -> Vec<Self> {
        list_items(payload, "groups")
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }
}

/// Delivery state of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryStatus {
    /// Appended optimistically or confirmed by the backend
    Sent,
    /// The send request failed; the entry stays in the transcript
    Failed,
}

/// One entry in a chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Local id assigned when the entry is created
    pub local_id: String,
    /// Backend id once known
    pub server_id: Option<String>,
    pub conversation_id: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub status: DeliveryStatus,
}

impl ChatMessage {
    pub fn outgoing(conversation_id: &str, content: &str, sent_at: DateTime<Utc>) -> Self {
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            server_id: None,
            conversation_id: conversation_id.to_string(),
            content: content.to_string(),
            sent_at,
            status: DeliveryStatus::Sent,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == DeliveryStatus::Failed
    }
}

/// Body of `POST /messaging/send`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub content: String,
}

impl OutgoingMessage {
    pub fn validate(&self) -> ClientResult<()> {
        if self.content.trim().is_empty() {
            return Err(ClientError::validation("Please type a message"));
        }
        if self.content.chars().count() > MAX_MESSAGE_LEN {
            return Err(ClientError::validation("Message is too long"));
        }
        if self.recipient_id.is_none() && self.group_id.is_none() {
            return Err(ClientError::validation("Please choose a conversation"));
        }
        Ok(())
    }
}

/// Acknowledgement of a sent message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendReceipt {
    pub message_id: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl SendReceipt {
    pub fn from_value(payload: &Value) -> Self {
        let body = super::decode::object_payload(payload, "message");
        Self {
            message_id: id_of(body, &["id", "message_id"]),
            sent_at: first_datetime(body, &["created_at", "sent_at", "timestamp"]),
        }
    }
}

/// Body of `POST /messaging/groups`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub member_ids: Vec<String>,
}

impl GroupDraft {
    pub fn validate(&self) -> ClientResult<()> {
        if self.name.trim().is_empty() {
            return Err(ClientError::validation("Please enter a group name"));
        }
        if self.member_ids.is_empty() {
            return Err(ClientError::validation("Please add at least one member"));
        }
        Ok(())
    }
}
