//! Renderable panel state

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

/// Where a panel is in its fetch cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Data plus fetch phase for one panel.
///
/// On error `data` is reset to `T::default()`, which every model defines as
/// its empty state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelState<T> {
    pub phase: Phase,
    pub data: T,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T: Default> PanelState<T> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            data: T::default(),
            error: None,
            last_updated: None,
        }
    }

    pub fn start_loading(&mut self) {
        self.phase = Phase::Loading;
    }

    /// Replace the data wholesale; nothing is merged with the previous fetch
    pub fn succeed(&mut self, data: T, at: DateTime<Utc>) {
        self.phase = Phase::Success;
        self.data = data;
        self.error = None;
        self.last_updated = Some(at);
    }

    pub fn fail(&mut self, message: String, at: DateTime<Utc>) {
        self.phase = Phase::Error;
        self.data = T::default();
        self.error = Some(message);
        self.last_updated = Some(at);
    }

    /// Back to idle after an unmount cancelled a fetch in flight
    pub fn settle(&mut self) {
        if self.phase == Phase::Loading {
            self.phase = Phase::Idle;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}
