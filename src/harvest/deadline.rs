//! Cooperative harvest deadline
//!
//! A [`Deadline`] is a monotonic flag (unset -> set, never reset) shared by
//! every adapter of one harvest. Adapters check it before each new listing
//! page and before each detail fetch; requests already in flight are not
//! aborted, so a harvest can overrun the ceiling by at most one request
//! timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct DeadlineInner {
    expired: AtomicBool,
    notify: Notify,
}

/// Shared cancellation signal for one harvest
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    inner: Arc<DeadlineInner>,
}

impl Deadline {
    /// Creates an unexpired deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the deadline has fired
    pub fn is_expired(&self) -> bool {
        self.inner.expired.load(Ordering::Acquire)
    }

    /// Fires the deadline; later calls are no-ops
    pub fn expire(&self) {
        if !self.inner.expired.swap(true, Ordering::AcqRel) {
            tracing::debug!("Harvest deadline expired");
            self.inner.notify.notify_waiters();
        }
    }

    /// Waits until the deadline fires
    pub async fn expired(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_expired() {
                return;
            }
            notified.await;
        }
    }

    /// Starts a timer that fires the deadline after `ceiling`
    ///
    /// The timer races the harvest: disarming (or dropping) the returned
    /// handle wakes the timer early so it stops without firing.
    pub fn arm(&self, ceiling: Duration) -> DeadlineTimer {
        let (done_tx, done_rx) = oneshot::channel::<()>();
        let deadline = self.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(ceiling) => {
                    tracing::info!("Harvest ceiling of {:?} reached", ceiling);
                    deadline.expire();
                }
                _ = done_rx => {}
            }
        });

        DeadlineTimer {
            done: Some(done_tx),
            handle: Some(handle),
        }
    }
}

/// Handle to a running deadline timer
#[derive(Debug)]
pub struct DeadlineTimer {
    done: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DeadlineTimer {
    /// Stops the timer without firing the deadline and waits for it to exit
    pub async fn disarm(mut self) {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
    }
}
