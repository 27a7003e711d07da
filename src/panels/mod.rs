//! Feature panels
//!
//! Each panel owns its remote data through [`Panel`](crate::view::Panel)
//! slots and exposes the user actions of one feature area.

pub mod achievements;
pub mod dashboard;
pub mod messaging;
pub mod notifications;
pub mod payments;
pub mod tutor_chat;

use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{Capability, Role};
use crate::view::Lifecycle;

pub use achievements::AchievementsPanel;
pub use dashboard::{DashboardPanel, DashboardView, Section};
pub use messaging::{Conversation, MessagingPanel};
pub use notifications::{MarkReadOutcome, NotificationCenter};
pub use payments::{PaymentsData, PaymentsPanel};
pub use tutor_chat::{Speaker, TutorChat, TutorTurn};

/// What every panel needs: the API, the signed-in user, and a lifecycle.
///
/// Clones share the lifecycle, so child panels unmount with their parent.
#[derive(Clone)]
pub struct PanelContext {
    pub api: Arc<ApiClient>,
    pub clock: Arc<dyn Clock>,
    pub lifecycle: Lifecycle,
    pub role: Role,
    pub user_id: String,
    pub poll_interval: Duration,
}

impl PanelContext {
    pub fn new(api: Arc<ApiClient>, role: Role, user_id: &str) -> Self {
        Self {
            api,
            clock: SystemClock::shared(),
            lifecycle: Lifecycle::new(),
            role,
            user_id: user_id.to_string(),
            poll_interval: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &Config, api: Arc<ApiClient>, role: Role, user_id: &str) -> Self {
        Self {
            poll_interval: config.poll_interval_duration(),
            ..Self::new(api, role, user_id)
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Same user and API under an independent lifecycle
    pub fn detached(&self) -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            ..self.clone()
        }
    }

    /// Refuse an action the role is not offered
    pub fn require(&self, capability: Capability) -> ClientResult<()> {
        if self.role.can(capability) {
            Ok(())
        } else {
            Err(ClientError::forbidden(self.role))
        }
    }
}
