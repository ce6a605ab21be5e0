use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// Consulted right before every range request.
pub trait Pacer: Send + Sync {
    /// Blocks until the next request may go out.
    fn pace(&self);
}

/// Keeps at least `min_interval` between requests, sleeping no longer than
/// `max_wait` per request.
#[derive(Debug)]
pub struct MinIntervalPacer {
    min_interval: Duration,
    max_wait: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl MinIntervalPacer {
    pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);
    pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60);

    pub fn new(min_interval: Duration, max_wait: Duration) -> Self {
        Self {
            min_interval,
            max_wait,
            last_request: Mutex::new(None),
        }
    }

    /// How long a request made at `now` would have to wait.
    fn delay_at(&self, last: Option<Instant>, now: Instant) -> Duration {
        let Some(last) = last else {
            return Duration::ZERO;
        };
        self.min_interval
            .saturating_sub(now.saturating_duration_since(last))
            .min(self.max_wait)
    }
}

impl Default for MinIntervalPacer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_INTERVAL, Self::DEFAULT_MAX_WAIT)
    }
}

impl Pacer for MinIntervalPacer {
    fn pace(&self) {
        // The lock is held across the sleep so concurrent callers queue up
        // behind each other instead of all waking at once.
        let mut last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());

        let delay = self.delay_at(*last, Instant::now());
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "pacing range request");
            std::thread::sleep(delay);
        }

        *last = Some(Instant::now());
    }
}
