//! Periodic refresh bound to a view's lifecycle.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::lifecycle::Lifecycle;

/// Background refresh task. Stops on unmount, on [`Poller::stop`], or on drop.
#[derive(Debug)]
pub struct Poller {
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Call `tick` every `interval`, starting one interval from now.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start<F, Fut>(lifecycle: &Lifecycle, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut token = lifecycle.token();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => tick().await,
                }
            }
            tracing::debug!("Poller stopped");
        });

        Self { handle: Some(handle) }
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
