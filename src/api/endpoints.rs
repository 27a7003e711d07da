//! Backend endpoint paths.
//!
//! Every path the client calls is produced here, relative to the API base.

use std::fmt;
use url::form_urlencoded;

use crate::models::{LeaderboardCategory, LeaderboardPeriod};

/// REST endpoint consumed by the panels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Students,
    Attendance,
    Payments,
    Profile(String),
    FeeBalance(String),
    FeeStructure,
    PaymentPlans,
    PaymentPlan(String),
    Notifications,
    SendNotification,
    MarkNotificationRead(String),
    MessagingContacts,
    MessagingSend,
    MessagingGroups,
    Leaderboard {
        period: LeaderboardPeriod,
        category: LeaderboardCategory,
    },
    StudentAchievements(String),
    CreateAchievement,
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Health => "/health".to_string(),
            Endpoint::Students => "/students".to_string(),
            Endpoint::Attendance => "/attendance".to_string(),
            Endpoint::Payments => "/payments".to_string(),
            Endpoint::Profile(user_id) => format!("/profile/{}", segment(user_id)),
            Endpoint::FeeBalance(user_id) => format!("/fee-balance/{}", segment(user_id)),
            Endpoint::FeeStructure => "/fee-structure".to_string(),
            Endpoint::PaymentPlans => "/payment-plans".to_string(),
            Endpoint::PaymentPlan(id) => format!("/payment-plans/{}", segment(id)),
            Endpoint::Notifications => "/notifications/".to_string(),
            Endpoint::SendNotification => "/notifications/send".to_string(),
            Endpoint::MarkNotificationRead(id) => format!("/notifications/{}/read", segment(id)),
            Endpoint::MessagingContacts => "/messaging/contacts".to_string(),
            Endpoint::MessagingSend => "/messaging/send".to_string(),
            Endpoint::MessagingGroups => "/messaging/groups".to_string(),
            Endpoint::Leaderboard { period, category } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("period", period.as_ref())
                    .append_pair("category", category.as_ref())
                    .finish();
                format!("/leaderboard?{query}")
            }
            Endpoint::StudentAchievements(id) => format!("/achievements/student/{}", segment(id)),
            Endpoint::CreateAchievement => "/achievements/create".to_string(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Percent-encode an id for use as one path segment
fn segment(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
