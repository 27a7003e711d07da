//! Notification center
//!
//! Lists notifications, tracks the unread count, and marks items read
//! optimistically. Clones share state, so a parent view can hand the same
//! center to its children.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use super::PanelContext;
use crate::error::ClientResult;
use crate::logging::log_optimistic_rollover;
use crate::models::{Capability, Notification, NotificationDraft};
use crate::view::{Alert, AlertSlot, LoadOutcome, Panel, PanelState};

const PANEL: &str = "notifications";

/// Result of a mark-read call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkReadOutcome {
    /// Flag set locally and confirmed by the backend
    Marked,
    /// Already read; nothing changed and no request was made
    AlreadyRead,
    NotFound,
    /// Flag set locally but the request failed; the id is kept as failed
    Failed,
    /// Flag set locally; the view unmounted before the backend answered
    Unconfirmed,
}

/// Renderable notification center
#[derive(Debug, Clone, Serialize)]
pub struct NotificationsView {
    pub state: PanelState<Vec<Notification>>,
    pub unread_count: usize,
    pub failed_ids: Vec<String>,
}

#[derive(Clone)]
pub struct NotificationCenter {
    context: PanelContext,
    list: Panel<Vec<Notification>>,
    failed: Arc<Mutex<BTreeSet<String>>>,
    alerts: AlertSlot,
}

impl NotificationCenter {
    pub fn new(context: PanelContext) -> Self {
        let list = Panel::new(PANEL, context.lifecycle.clone(), context.clock.clone());
        Self {
            context,
            list,
            failed: Arc::new(Mutex::new(BTreeSet::new())),
            alerts: AlertSlot::new(),
        }
    }

    pub async fn mount(&self) -> LoadOutcome {
        self.context.lifecycle.mount();
        self.refresh().await
    }

    pub fn unmount(&self) {
        self.context.lifecycle.unmount();
    }

    /// Full refetch; the backend's read flags replace local ones
    pub async fn refresh(&self) -> LoadOutcome {
        let api = self.context.api.clone();
        let received_at = self.context.clock.now_utc();
        let outcome = self.list.load(async move { api.notifications(received_at).await }).await;
        if outcome == LoadOutcome::Loaded {
            self.failed.lock().await.clear();
        }
        outcome
    }

    pub async fn unread_count(&self) -> usize {
        self.list
            .snapshot()
            .await
            .data
            .iter()
            .filter(|n| !n.is_read())
            .count()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.list.data().await
    }

    pub async fn by_category(&self, category: &str) -> Vec<Notification> {
        self.list
            .data()
            .await
            .into_iter()
            .filter(|n| n.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Mark one notification read.
    ///
    /// The flag is set locally before the request. Only the first call for an
    /// id changes anything; `read_at` keeps that first timestamp. A failed
    /// request leaves the flag set and records the id as failed.
    pub async fn mark_read(&self, id: &str) -> MarkReadOutcome {
        let now = self.context.clock.now_utc();
        let local = self
            .list
            .update(|list| match list.iter_mut().find(|n| n.id == id) {
                None => MarkReadOutcome::NotFound,
                Some(n) if n.is_read() => MarkReadOutcome::AlreadyRead,
                Some(n) => {
                    n.read_at = Some(now);
                    MarkReadOutcome::Marked
                }
            })
            .await;

        if local != MarkReadOutcome::Marked {
            return local;
        }

        let api = self.context.api.clone();
        let mut token = self.context.lifecycle.token();
        match token.run(async { api.mark_notification_read(id).await }).await {
            Ok(()) => MarkReadOutcome::Marked,
            Err(error) if error.is_cancelled() => MarkReadOutcome::Unconfirmed,
            Err(error) => {
                log_optimistic_rollover(PANEL, id, &error);
                self.failed.lock().await.insert(id.to_string());
                MarkReadOutcome::Failed
            }
        }
    }

    /// Mark every unread notification; returns how many were newly marked
    pub async fn mark_all_read(&self) -> usize {
        let unread: Vec<String> = self
            .list
            .data()
            .await
            .into_iter()
            .filter(|n| !n.is_read())
            .map(|n| n.id)
            .collect();

        let outcomes = futures_util::future::join_all(unread.iter().map(|id| self.mark_read(id))).await;
        outcomes
            .into_iter()
            .filter(|o| {
                matches!(
                    o,
                    MarkReadOutcome::Marked | MarkReadOutcome::Failed | MarkReadOutcome::Unconfirmed
                )
            })
            .count()
    }

    /// Send a notification (staff only). Failures raise an alert.
    pub async fn send(&self, draft: &NotificationDraft) -> ClientResult<()> {
        let result: ClientResult<()> = async {
            self.context.require(Capability::SendNotification)?;
            draft.validate()?;
            self.context.api.send_notification(draft).await
        }
        .await;

        if let Err(error) = &result {
            self.alerts.raise(error);
        }
        result
    }

    pub async fn failed_ids(&self) -> Vec<String> {
        self.failed.lock().await.iter().cloned().collect()
    }

    pub fn take_alert(&self) -> Option<Alert> {
        self.alerts.take()
    }

    pub async fn view(&self) -> NotificationsView {
        let state = self.list.snapshot().await;
        let unread_count = state.data.iter().filter(|n| !n.is_read()).count();
        NotificationsView {
            state,
            unread_count,
            failed_ids: self.failed_ids().await,
        }
    }
}
