//! Achievements and leaderboard models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use super::decode::{first_datetime, first_i64, first_str, id_of, list_items, str_or};
use super::payment::saturating_sum;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub points: i64,
    pub icon: Option<String>,
    pub awarded_at: Option<DateTime<Utc>>,
}

impl Achievement {
    /// `title ?? name ?? "Achievement"`, `points ?? score ?? 0`
    pub fn from_value(item: &Value) -> Option<Self> {
        Some(Self {
            id: id_of(item, &["id", "achievement_id"])?,
            title: str_or(item, &["title", "name"], "Achievement"),
            description: str_or(item, &["description", "details"], ""),
            category: str_or(item, &["category", "type"], "general"),
            points: first_i64(item, &["points", "score"]).unwrap_or(0),
            icon: first_str(item, &["icon", "badge"]),
            awarded_at: first_datetime(item, &["awarded_at", "date_earned", "created_at"]),
        })
    }

    pub fn list_from_value(payload: &Value) -> Vec<Self> {
        list_items(payload, "achievements")
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }

    pub fn total_points(list: &[Self]) -> i64 {
        saturating_sum(list.iter().map(|a| a.points))
    }
}

/// Body of `POST /achievements/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDraft {
    pub student_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub points: i64,
}

impl AchievementDraft {
    pub fn validate(&self) -> ClientResult<()> {
        if self.student_id.trim().is_empty() {
            return Err(ClientError::validation("Please select a student"));
        }
        if self.title.trim().is_empty() {
            return Err(ClientError::validation("Please enter an achievement title"));
        }
        if self.points < 0 {
            return Err(ClientError::validation("Points cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaderboardPeriod {
    Weekly,
    #[default]
    Monthly,
    Term,
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaderboardCategory {
    #[default]
    Overall,
    Academic,
    Attendance,
    Sports,
    Behaviour,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub student_id: String,
    pub name: String,
    pub points: i64,
    pub class_name: Option<String>,
}

impl LeaderboardEntry {
    /// `rank` defaults to the 1-based position in the list
    pub fn list_from_value(payload: &Value) -> Vec<Self> {
        let items = match payload.get("leaderboard") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => list_items(payload, "entries"),
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(position, item)| {
                let fallback_rank = i64::try_from(position + 1).unwrap_or(i64::MAX);
                let rank = first_i64(item, &["rank", "position"]).unwrap_or(fallback_rank);
                Some(Self {
                    rank: u32::try_from(rank.max(1)).unwrap_or(u32::MAX),
                    student_id: id_of(item, &["student_id", "id"])?,
                    name: str_or(item, &["name", "student_name"], "Unknown"),
                    points: first_i64(item, &["points", "score", "total_points"]).unwrap_or(0),
                    class_name: first_str(item, &["class_name", "class"]),
                })
            })
            .collect()
    }
}
