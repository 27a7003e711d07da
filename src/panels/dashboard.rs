//! Role dashboard
//!
//! Composes the sections a role sees. Every section is its own fetch slot,
//! so one failing endpoint empties only its own card. The dashboard owns
//! the notification center and hands clones of it to child views.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter};

use super::notifications::{NotificationCenter, NotificationsView};
use super::PanelContext;
use crate::models::{
    Achievement, AttendanceRecord, AttendanceSummary, Capability, FeeBalance, LeaderboardCategory, LeaderboardEntry,
    LeaderboardPeriod, Payment, Profile, Role, Student,
};
use crate::view::{LoadOutcome, Panel, PanelState, Poller};

/// Dashboard card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Section {
    Students,
    Attendance,
    Payments,
    Profile,
    FeeBalance,
    Notifications,
    Achievements,
    Leaderboard,
}

impl Section {
    /// Capability a role needs before the card is shown
    pub fn required_capability(self) -> Option<Capability> {
        match self {
            Section::Students => Some(Capability::ViewStudentRoster),
            Section::Attendance => Some(Capability::RecordAttendance),
            Section::Payments => Some(Capability::ViewAllPayments),
            Section::FeeBalance => Some(Capability::ViewOwnFees),
            Section::Profile | Section::Notifications | Section::Achievements | Section::Leaderboard => None,
        }
    }

    /// Cards shown to `role`, in display order
    pub fn sections_for(role: Role) -> Vec<Section> {
        let layout: &[Section] = match role {
            Role::Admin | Role::Teacher => &[Section::Students, Section::Attendance, Section::Payments],
            Role::Parent => &[Section::Profile, Section::FeeBalance, Section::Notifications],
            Role::Student => &[Section::Profile, Section::Achievements, Section::Leaderboard],
        };
        layout
            .iter()
            .copied()
            .filter(|section| section.required_capability().is_none_or(|c| role.can(c)))
            .collect()
    }
}

/// Serializable snapshot of everything the role sees
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub role: Role,
    pub title: String,
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<PanelState<Vec<Student>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<PanelState<Vec<AttendanceRecord>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_summary: Option<AttendanceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<PanelState<Vec<Payment>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<PanelState<Profile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_balance: Option<PanelState<FeeBalance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationsView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<PanelState<Vec<Achievement>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<PanelState<Vec<LeaderboardEntry>>>,
}

#[derive(Clone)]
pub struct DashboardPanel {
    context: PanelContext,
    students: Panel<Vec<Student>>,
    attendance: Panel<Vec<AttendanceRecord>>,
    payments: Panel<Vec<Payment>>,
    profile: Panel<Profile>,
    fee_balance: Panel<FeeBalance>,
    achievements: Panel<Vec<Achievement>>,
    leaderboard: Panel<Vec<LeaderboardEntry>>,
    notifications: NotificationCenter,
    poller: Arc<Mutex<Option<Poller>>>,
}

impl DashboardPanel {
    pub fn new(context: PanelContext) -> Self {
        let life = &context.lifecycle;
        let clock = &context.clock;
        Self {
            students: Panel::new("students", life.clone(), clock.clone()),
            attendance: Panel::new("attendance", life.clone(), clock.clone()),
            payments: Panel::new("payments", life.clone(), clock.clone()),
            profile: Panel::new("profile", life.clone(), clock.clone()),
            fee_balance: Panel::new("fee_balance", life.clone(), clock.clone()),
            achievements: Panel::new("achievements", life.clone(), clock.clone()),
            leaderboard: Panel::new("leaderboard", life.clone(), clock.clone()),
            notifications: NotificationCenter::new(context.clone()),
            poller: Arc::new(Mutex::new(None)),
            context,
        }
    }

    pub fn role(&self) -> Role {
        self.context.role
    }

    pub fn sections(&self) -> Vec<Section> {
        Section::sections_for(self.context.role)
    }

    /// Shared notification center for child views
    pub fn notifications(&self) -> NotificationCenter {
        self.notifications.clone()
    }

    /// Mount, load every section, and keep refreshing on the poll interval
    pub async fn mount(&self) -> Vec<(Section, LoadOutcome)> {
        self.context.lifecycle.mount();
        let outcomes = self.refresh().await;

        let dashboard = self.clone();
        let poller = Poller::start(&self.context.lifecycle, self.context.poll_interval, move || {
            let dashboard = dashboard.clone();
            async move {
                dashboard.refresh().await;
            }
        });
        *self.lock_poller() = Some(poller);

        outcomes
    }

    pub fn unmount(&self) {
        self.context.lifecycle.unmount();
        if let Some(mut poller) = self.lock_poller().take() {
            poller.stop();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.lock_poller().as_ref().is_some_and(Poller::is_running)
    }

    /// Load the role's sections in parallel
    pub async fn refresh(&self) -> Vec<(Section, LoadOutcome)> {
        let sections = self.sections();
        let outcomes = futures_util::future::join_all(sections.iter().map(|s| self.load_section(*s))).await;
        sections.into_iter().zip(outcomes).collect()
    }

    pub async fn load_section(&self, section: Section) -> LoadOutcome {
        let api = self.context.api.clone();
        let user_id = self.context.user_id.clone();
        match section {
            Section::Students => self.students.load(async move { api.students().await }).await,
            Section::Attendance => self.attendance.load(async move { api.attendance().await }).await,
            Section::Payments => self.payments.load(async move { api.payments().await }).await,
            Section::Profile => self.profile.load(async move { api.profile(&user_id).await }).await,
            Section::FeeBalance => self.fee_balance.load(async move { api.fee_balance(&user_id).await }).await,
            Section::Notifications => self.notifications.refresh().await,
            Section::Achievements => {
                self.achievements
                    .load(async move { api.student_achievements(&user_id).await })
                    .await
            }
            Section::Leaderboard => {
                self.leaderboard
                    .load(async move { api.leaderboard(LeaderboardPeriod::default(), LeaderboardCategory::default()).await })
                    .await
            }
        }
    }

    pub async fn view(&self) -> DashboardView {
        let sections = self.sections();
        let shows = |section| sections.contains(&section);

        let attendance = if shows(Section::Attendance) {
            Some(self.attendance.snapshot().await)
        } else {
            None
        };
        let attendance_summary = attendance.as_ref().map(|a| AttendanceSummary::from_records(&a.data));

        DashboardView {
            role: self.context.role,
            title: format!("{} Dashboard", self.context.role.display_name()),
            sections: sections.clone(),
            students: snapshot_if(shows(Section::Students), &self.students).await,
            attendance,
            attendance_summary,
            payments: snapshot_if(shows(Section::Payments), &self.payments).await,
            profile: snapshot_if(shows(Section::Profile), &self.profile).await,
            fee_balance: snapshot_if(shows(Section::FeeBalance), &self.fee_balance).await,
            notifications: if shows(Section::Notifications) {
                Some(self.notifications.view().await)
            } else {
                None
            },
            achievements: snapshot_if(shows(Section::Achievements), &self.achievements).await,
            leaderboard: snapshot_if(shows(Section::Leaderboard), &self.leaderboard).await,
        }
    }

    fn lock_poller(&self) -> MutexGuard<'_, Option<Poller>> {
        match self.poller.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

async fn snapshot_if<T>(shown: bool, panel: &Panel<T>) -> Option<PanelState<T>>
where
    T: Default + Clone + Send + Sync,
{
    if shown {
        Some(panel.snapshot().await)
    } else {
        None
    }
}
