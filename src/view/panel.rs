//! Fetch-on-mount state holder shared by every feature panel.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::Instrument;

use super::lifecycle::{run_latest, FetchSlot, Lifecycle};
use super::state::PanelState;
use crate::clock::Clock;
use crate::error::ClientResult;
use crate::logging::{log_fetch_failure, log_stale_result};
use crate::panel_span;

/// How a load call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// The fetch failed and the panel now shows its empty state
    FellBack,
    /// Unmounted or superseded; state was left untouched
    Discarded,
}

/// One slot of remote data with its fetch phase
#[derive(Clone)]
pub struct Panel<T> {
    name: &'static str,
    lifecycle: Lifecycle,
    slot: FetchSlot,
    clock: Arc<dyn Clock>,
    state: Arc<RwLock<PanelState<T>>>,
}

impl<T> Panel<T>
where
    T: Default + Clone + Send + Sync,
{
    pub fn new(name: &'static str, lifecycle: Lifecycle, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            lifecycle,
            slot: FetchSlot::new(),
            clock,
            state: Arc::new(RwLock::new(PanelState::new())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Run one idle → loading → success | error cycle.
    ///
    /// Failures are logged and replaced by the empty state. Results of a
    /// fetch superseded by a newer one, or finishing after unmount, are dropped.
    pub async fn load<F>(&self, fetch: F) -> LoadOutcome
    where
        F: Future<Output = ClientResult<T>>,
    {
        if !self.lifecycle.is_mounted() {
            return LoadOutcome::Discarded;
        }

        let span = panel_span!(self.name, "load");
        self.run_load(fetch).instrument(span).await
    }

    async fn run_load<F>(&self, fetch: F) -> LoadOutcome
    where
        F: Future<Output = ClientResult<T>>,
    {
        let mut life_token = self.lifecycle.token();
        let (generation, mut slot_token) = self.slot.begin();
        tracing::Span::current().record("generation", generation);

        self.state.write().await.start_loading();

        let result = run_latest(&mut life_token, &mut slot_token, fetch).await;
        let now = self.clock.now_utc();

        match result {
            Ok(data) => {
                self.state.write().await.succeed(data, now);
                LoadOutcome::Loaded
            }
            Err(error) if error.is_cancelled() => {
                log_stale_result(self.name, generation);
                if !self.lifecycle.is_mounted() {
                    self.state.write().await.settle();
                }
                LoadOutcome::Discarded
            }
            Err(error) => {
                log_fetch_failure(self.name, &error);
                self.state.write().await.fail(error.to_string(), now);
                LoadOutcome::FellBack
            }
        }
    }

    pub async fn snapshot(&self) -> PanelState<T> {
        self.state.read().await.clone()
    }

    pub async fn data(&self) -> T {
        self.state.read().await.data.clone()
    }

    /// Apply a local edit to loaded data without changing the phase
    pub async fn update<R>(&self, edit: impl FnOnce(&mut T) -> R) -> R {
        let mut state = self.state.write().await;
        edit(&mut state.data)
    }
}
