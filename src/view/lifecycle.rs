//! Mount lifecycle and fetch cancellation.
//!
//! A panel's lifecycle carries a mount epoch that changes on every unmount.
//! Work started under one epoch is cancelled when the epoch moves, so no
//! result lands on a view that is gone.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{ClientError, ClientResult};

#[derive(Debug)]
struct LifecycleInner {
    mounted: AtomicBool,
    epoch: watch::Sender<u64>,
}

/// Shared mount state of one view and everything it owns
#[derive(Debug, Clone)]
pub struct Lifecycle {
    inner: Arc<LifecycleInner>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// A fresh lifecycle starts unmounted
    pub fn new() -> Self {
        let (epoch, _) = watch::channel(0);
        Self {
            inner: Arc::new(LifecycleInner {
                mounted: AtomicBool::new(false),
                epoch,
            }),
        }
    }

    pub fn mount(&self) {
        self.inner.mounted.store(true, Ordering::SeqCst);
    }

    /// Cancel everything started under the current epoch
    pub fn unmount(&self) {
        self.inner.mounted.store(false, Ordering::SeqCst);
        self.inner.epoch.send_modify(|epoch| *epoch += 1);
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    /// Token cancelled by the next unmount
    pub fn token(&self) -> CancelToken {
        CancelToken::new(&self.inner.epoch)
    }
}

/// Fires once the watched counter moves past the value seen at creation
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<u64>,
    expected: u64,
}

impl CancelToken {
    pub fn new(sender: &watch::Sender<u64>) -> Self {
        let rx = sender.subscribe();
        let expected = *rx.borrow();
        Self { rx, expected }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() != self.expected
    }

    /// Resolves when cancelled. A dropped sender counts as cancelled.
    pub async fn cancelled(&mut self) {
        while !self.is_cancelled() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Run `work` unless this token fires first
    pub async fn run<T, F>(&mut self, work: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        tokio::select! {
            biased;
            () = self.cancelled() => Err(ClientError::Cancelled),
            result = work => {
                if self.is_cancelled() {
                    Err(ClientError::Cancelled)
                } else {
                    result
                }
            }
        }
    }
}

/// Latest-wins counter for one fetch slot.
///
/// Starting a fetch bumps the counter, cancelling the one before it.
#[derive(Debug, Clone)]
pub struct FetchSlot {
    generation: Arc<watch::Sender<u64>>,
}

impl Default for FetchSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchSlot {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            generation: Arc::new(generation),
        }
    }

    /// Supersede any fetch in flight and hand out a token for the new one
    pub fn begin(&self) -> (u64, CancelToken) {
        self.generation.send_modify(|g| *g += 1);
        let token = CancelToken::new(&self.generation);
        (token.expected, token)
    }

    pub fn current(&self) -> u64 {
        *self.generation.borrow()
    }
}

/// Run `work` until it finishes, the view unmounts, or a newer fetch starts
pub async fn run_latest<T, F>(lifecycle: &mut CancelToken, slot: &mut CancelToken, work: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    if lifecycle.is_cancelled() || slot.is_cancelled() {
        return Err(ClientError::Cancelled);
    }

    let result = tokio::select! {
        biased;
        () = lifecycle.cancelled() => Err(ClientError::Cancelled),
        () = slot.cancelled() => Err(ClientError::Cancelled),
        result = work => result,
    };

    if lifecycle.is_cancelled() || slot.is_cancelled() {
        return Err(ClientError::Cancelled);
    }
    result
}
