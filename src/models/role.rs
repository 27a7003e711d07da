//! User roles and the UI capabilities they unlock.
//!
//! Role gating only decides which controls a panel offers. The backend
//! authorizes every mutating call on its own.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Portal user role
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    Teacher,
    Parent,
    Student,
}

/// Controls a panel may show or hide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Capability {
    SendNotification,
    ManagePaymentPlans,
    ViewAllPayments,
    ViewOwnFees,
    CreateAchievement,
    CreateMessageGroup,
    RecordAttendance,
    ViewStudentRoster,
    UseTutor,
}

impl Role {
    /// Whether the role is offered `capability` in the UI
    pub fn can(self, capability: Capability) -> bool {
        match capability {
            Capability::SendNotification
            | Capability::CreateAchievement
            | Capability::CreateMessageGroup
            | Capability::RecordAttendance
            | Capability::ViewStudentRoster => matches!(self, Role::Admin | Role::Teacher),
            Capability::ManagePaymentPlans | Capability::ViewAllPayments => self == Role::Admin,
            Capability::ViewOwnFees => matches!(self, Role::Parent | Role::Student),
            Capability::UseTutor => match self {
                Role::Admin => false,
                Role::Teacher | Role::Parent | Role::Student => true,
            },
        }
    }

    /// Human label for headings
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Teacher => "Teacher",
            Role::Parent => "Parent",
            Role::Student => "Student",
        }
    }
}
