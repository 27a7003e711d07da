//! Achievements and leaderboard panel

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use super::PanelContext;
use crate::error::ClientResult;
use crate::models::{
    Achievement, AchievementDraft, Capability, LeaderboardCategory, LeaderboardEntry, LeaderboardPeriod, Role,
};
use crate::view::{Alert, AlertSlot, LoadOutcome, Panel, PanelState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeaderboardFilter {
    pub period: LeaderboardPeriod,
    pub category: LeaderboardCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementsView {
    pub student_id: Option<String>,
    pub achievements: PanelState<Vec<Achievement>>,
    pub total_points: i64,
    pub filter: LeaderboardFilter,
    pub leaderboard: PanelState<Vec<LeaderboardEntry>>,
}

#[derive(Clone)]
pub struct AchievementsPanel {
    context: PanelContext,
    achievements: Panel<Vec<Achievement>>,
    leaderboard: Panel<Vec<LeaderboardEntry>>,
    student_id: Arc<RwLock<Option<String>>>,
    filter: Arc<RwLock<LeaderboardFilter>>,
    alerts: AlertSlot,
}

impl AchievementsPanel {
    /// Students see their own achievements; other roles pick a student
    pub fn new(context: PanelContext) -> Self {
        let achievements = Panel::new("achievements", context.lifecycle.clone(), context.clock.clone());
        let leaderboard = Panel::new("leaderboard", context.lifecycle.clone(), context.clock.clone());
        let student_id = (context.role == Role::Student).then(|| context.user_id.clone());
        Self {
            context,
            achievements,
            leaderboard,
            student_id: Arc::new(RwLock::new(student_id)),
            filter: Arc::new(RwLock::new(LeaderboardFilter::default())),
            alerts: AlertSlot::new(),
        }
    }

    pub async fn mount(&self) -> (LoadOutcome, LoadOutcome) {
        self.context.lifecycle.mount();
        tokio::join!(self.load_achievements(), self.load_leaderboard())
    }

    pub fn unmount(&self) {
        self.context.lifecycle.unmount();
    }

    /// With no student selected the list stays empty and nothing is fetched
    pub async fn load_achievements(&self) -> LoadOutcome {
        let Some(student_id) = self.student_id.read().await.clone() else {
            return LoadOutcome::Discarded;
        };
        let api = self.context.api.clone();
        self.achievements
            .load(async move { api.student_achievements(&student_id).await })
            .await
    }

    pub async fn load_leaderboard(&self) -> LoadOutcome {
        let filter = *self.filter.read().await;
        let api = self.context.api.clone();
        self.leaderboard
            .load(async move { api.leaderboard(filter.period, filter.category).await })
            .await
    }

    pub async fn select_student(&self, student_id: &str) -> LoadOutcome {
        *self.student_id.write().await = Some(student_id.to_string());
        self.load_achievements().await
    }

    /// Change the leaderboard filter and refetch. A slower earlier fetch
    /// never overwrites the result for the newer filter.
    pub async fn set_filter(&self, period: LeaderboardPeriod, category: LeaderboardCategory) -> LoadOutcome {
        *self.filter.write().await = LeaderboardFilter { period, category };
        self.load_leaderboard().await
    }

    pub async fn achievements(&self) -> Vec<Achievement> {
        self.achievements.data().await
    }

    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard.data().await
    }

    /// Award an achievement (staff only)
    pub async fn create(&self, draft: &AchievementDraft) -> ClientResult<Option<Achievement>> {
        let result: ClientResult<Option<Achievement>> = async {
            self.context.require(Capability::CreateAchievement)?;
            draft.validate()?;
            self.context.api.create_achievement(draft).await
        }
        .await;

        match result {
            Ok(created) => {
                let showing = self.student_id.read().await.clone();
                if showing.as_deref() == Some(draft.student_id.as_str()) {
                    self.load_achievements().await;
                }
                Ok(created)
            }
            Err(error) => {
                self.alerts.raise(&error);
                Err(error)
            }
        }
    }

    pub fn take_alert(&self) -> Option<Alert> {
        self.alerts.take()
    }

    pub async fn view(&self) -> AchievementsView {
        let achievements = self.achievements.snapshot().await;
        AchievementsView {
            student_id: self.student_id.read().await.clone(),
            total_points: Achievement::total_points(&achievements.data),
            achievements,
            filter: *self.filter.read().await,
            leaderboard: self.leaderboard.snapshot().await,
        }
    }
}
