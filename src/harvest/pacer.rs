//! Per-host politeness pacing
//!
//! Every request to a host reserves the next free slot for that host; slots
//! are spaced by a minimum interval. Concurrent callers for the same host
//! therefore queue up behind each other instead of hitting the site at once,
//! while requests to different hosts never wait on each other.
//!
//! A caller whose deadline fires while it waits gives its slot back, so the
//! queue only ever accounts for requests that actually went out or are still
//! waiting.

use crate::harvest::Deadline;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tracks the pacing state of one host
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Number of slots reserved for this host
    pub request_count: u32,

    /// Slot of the latest request that was actually sent
    pub last_sent: Option<Instant>,

    /// Slots reserved by callers still waiting for their turn
    pub pending: BTreeSet<Instant>,
}

impl HostState {
    /// Earliest instant a new reservation may start
    fn next_free(&self, interval: Duration) -> Option<Instant> {
        let after_pending = self.pending.last().map(|slot| *slot + interval);
        let after_sent = self.last_sent.map(|slot| slot + interval);
        after_pending.max(after_sent)
    }
}

/// Interval limiter keyed by host, shared by all adapters of a harvest
#[derive(Debug)]
pub struct HostPacer {
    interval: Duration,
    hosts: Mutex<HashMap<String, HostState>>,
}

impl HostPacer {
    /// Creates a pacer enforcing `interval` between requests to one host
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Reserves the next slot for `host` and returns its start instant
    ///
    /// The slot stays pending until it is either [`sent`](Self::sent) or
    /// [`released`](Self::release).
    pub fn reserve(&self, host: &str, now: Instant) -> Instant {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        let state = hosts.entry(host.to_string()).or_default();
        state.request_count += 1;

        if self.interval.is_zero() {
            return now;
        }

        let slot = state
            .next_free(self.interval)
            .map_or(now, |free| free.max(now));
        state.pending.insert(slot);
        slot
    }

    /// Marks a reserved slot as used by a request that went out
    pub fn sent(&self, host: &str, slot: Instant) {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = hosts.get_mut(host) {
            state.pending.remove(&slot);
            state.last_sent = state.last_sent.max(Some(slot));
        }
    }

    /// Gives back a reserved slot whose request was abandoned
    pub fn release(&self, host: &str, slot: Instant) {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = hosts.get_mut(host) {
            state.pending.remove(&slot);
        }
    }

    /// Waits until `host` may receive another request
    ///
    /// Returns `false` without waiting out the slot when `deadline` fires
    /// first; the slot is released in that case.
    pub async fn wait_turn(&self, host: &str, deadline: &Deadline) -> bool {
        let now = Instant::now();
        let slot = self.reserve(host, now);

        if slot > now {
            tracing::trace!("Pacing {} for {:?}", host, slot - now);
            tokio::select! {
                _ = tokio::time::sleep_until(slot.into()) => {}
                _ = deadline.expired() => {}
            }
        }

        if deadline.is_expired() {
            self.release(host, slot);
            return false;
        }
        self.sent(host, slot);
        true
    }

    /// Number of requests reserved for `host` so far
    pub fn request_count(&self, host: &str) -> u32 {
        let hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        hosts.get(host).map(|s| s.request_count).unwrap_or(0)
    }
}
