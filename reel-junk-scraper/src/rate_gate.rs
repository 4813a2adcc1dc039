//! Sliding-window rate limiting per upstream host class.
//!
//! Each host class keeps the timestamps of its recent requests. A caller may
//! proceed when fewer than `max_per_window` of them fall inside the trailing
//! one-second window; otherwise it sleeps until the oldest one ages out and
//! checks again. Concurrent callers race for the freed slot, so the check runs
//! in a loop rather than trusting a single sleep.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tokio::time::{Duration, Instant};

/// Length of the rolling window.
pub const WINDOW: Duration = Duration::from_millis(1000);

/// Shortest sleep between checks when the window is full.
const MIN_WAIT: Duration = Duration::from_millis(5);

/// Per-host-class sliding-window limiter. A ceiling of zero disables gating.
#[derive(Debug)]
pub struct RateGate {
    max_per_window: u32,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateGate {
    pub fn new(max_per_window: u32) -> Self {
        Self {
            max_per_window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Gate that never blocks.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn max_per_window(&self) -> u32 {
        self.max_per_window
    }

    /// Wait until a request against `host_class` is permitted, then record it.
    pub async fn acquire(&self, host_class: &str) {
        if self.max_per_window == 0 {
            return;
        }
        loop {
            match self.try_acquire(host_class, Instant::now()) {
                None => return,
                Some(wait) => {
                    log::debug!(
                        "rate gate: {} window full, waiting {}ms",
                        host_class,
                        wait.as_millis()
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Number of recorded requests for `host_class` still inside the window.
    pub fn in_window(&self, host_class: &str) -> usize {
        let now = Instant::now();
        let mut windows = self.lock();
        match windows.get_mut(host_class) {
            Some(window) => {
                prune(window, now);
                window.len()
            }
            None => 0,
        }
    }

    /// Record a request if the window has room, otherwise return how long to
    /// wait before the oldest entry leaves the window.
    fn try_acquire(&self, host_class: &str, now: Instant) -> Option<Duration> {
        let mut windows = self.lock();
        let window = windows.entry(host_class.to_string()).or_default();
        prune(window, now);

        if window.len() < self.max_per_window as usize {
            window.push_back(now);
            return None;
        }

        let oldest = window.front().copied().unwrap_or(now);
        let wait = (oldest + WINDOW).saturating_duration_since(now);
        Some(wait.max(MIN_WAIT))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn prune(window: &mut VecDeque<Instant>, now: Instant) {
    while let Some(&front) = window.front() {
        if now.saturating_duration_since(front) >= WINDOW {
            window.pop_front();
        } else {
            break;
        }
    }
}
