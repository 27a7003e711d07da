//! Models module for the portal client
//!
//! Typed request and response shapes and the decoders that normalize
//! backend payloads into them.

pub mod achievement;
pub mod attendance;
pub mod decode;
pub mod messaging;
pub mod notification;
pub mod payment;
pub mod profile;
pub mod role;

// Re-export commonly used types
pub use achievement::{Achievement, AchievementDraft, LeaderboardCategory, LeaderboardEntry, LeaderboardPeriod};
pub use attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary, Student};
pub use messaging::{ChatMessage, Contact, DeliveryStatus, Group, GroupDraft, OutgoingMessage, SendReceipt};
pub use notification::{Audience, Notification, NotificationDraft, Priority};
pub use payment::{format_ugx, FeeBalance, FeeItem, FeeStatus, Installment, Payment, PaymentPlan, PaymentPlanDraft, PaymentStatus};
pub use profile::Profile;
pub use role::{Capability, Role};
