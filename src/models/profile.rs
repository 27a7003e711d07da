//! User profile model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::decode::{first_str, id_of, object_payload};
use super::role::Role;

/// Profile shown on dashboards. The default is the empty state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub avatar: Option<String>,
    pub class_name: Option<String>,
    pub bio: Option<String>,
}

impl Profile {
    /// `{profile: {...}}`, `{user: {...}}` or the bare object.
    /// Name falls back `name ?? full_name ?? first_name + last_name`.
    pub fn from_value(payload: &Value) -> Self {
        let body = match payload.get("user").filter(|u| u.is_object()) {
            Some(user) if payload.get("profile").is_none() => user,
            _ => object_payload(payload, "profile"),
        };

        let name = first_str(body, &["name", "full_name"]).unwrap_or_else(|| {
            [first_str(body, &["first_name"]), first_str(body, &["last_name"])]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        });

        Self {
            id: id_of(body, &["id", "user_id"]).unwrap_or_default(),
            name,
            email: first_str(body, &["email"]),
            phone: first_str(body, &["phone", "phone_number"]),
            role: first_str(body, &["role"]).and_then(|r| r.parse().ok()),
            avatar: first_str(body, &["avatar", "avatar_url", "profile_picture"]),
            class_name: first_str(body, &["class_name", "class", "grade"]),
            bio: first_str(body, &["bio"]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty()
    }

    /// Two-letter initials for the avatar placeholder
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials
        }
    }
}
