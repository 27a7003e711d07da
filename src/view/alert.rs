//! Pending user-facing alert, the one visible error surface of a panel.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub message: String,
    pub error_code: &'static str,
}

impl Alert {
    pub fn from_error(error: &ClientError) -> Self {
        Self {
            message: error.user_message(),
            error_code: error.error_code(),
        }
    }
}

/// Holds at most one alert; a newer one replaces the older
#[derive(Debug, Clone, Default)]
pub struct AlertSlot {
    pending: Arc<Mutex<Option<Alert>>>,
}

impl AlertSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self, error: &ClientError) {
        let alert = Alert::from_error(error);
        tracing::debug!(error_code = alert.error_code, "Alert raised");
        match self.pending.lock() {
            Ok(mut slot) => *slot = Some(alert),
            Err(poisoned) => *poisoned.into_inner() = Some(alert),
        }
    }

    /// Take the pending alert, leaving the slot empty
    pub fn take(&self) -> Option<Alert> {
        match self.pending.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    pub fn peek(&self) -> Option<Alert> {
        match self.pending.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
