//! QuotaBackoff - wait for a quota reset in bounded slices

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use tokio::time::Instant;
use tracing::{debug, info};

/// Longest single sleep allowed while waiting
pub const MAX_SLICE: Duration = Duration::from_secs(60);

/// Deadline offset used when the requested wait overflows the calendar
const UNBOUNDED_WAIT_SECS: u64 = 100 * 365 * 24 * 3600;

/// Source of wall-clock time for quota deadlines
pub trait WallClock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Local>;
}

/// The host's local clock; keeps running while the machine is suspended
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Wall clock advanced by tokio's timer
///
/// Anchored to the local time at construction. Follows tokio's paused
/// clock, so quota waits can run in virtual time.
#[derive(Debug, Clone)]
pub struct TokioClock {
    anchor_wall: DateTime<Local>,
    anchor: Instant,
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            anchor_wall: Local::now(),
            anchor: Instant::now(),
        }
    }
}

impl WallClock for TokioClock {
    fn now(&self) -> DateTime<Local> {
        let elapsed = Instant::now().saturating_duration_since(self.anchor);
        TimeDelta::from_std(elapsed)
            .ok()
            .and_then(|delta| self.anchor_wall.checked_add_signed(delta))
            .unwrap_or(self.anchor_wall)
    }
}

/// Blocks the control flow until a fixed wall-clock deadline
///
/// The deadline is computed once; the wait is a series of sleeps no longer
/// than the slice, each re-reading the wall clock against that deadline,
/// so time spent with the host suspended counts toward the wait.
/// Dropping the future abandons the wait.
#[derive(Debug, Clone)]
pub struct QuotaBackoff {
    slice: Duration,
    clock: Arc<dyn WallClock>,
}

impl Default for QuotaBackoff {
    fn default() -> Self {
        Self {
            slice: MAX_SLICE,
            clock: Arc::new(SystemClock),
        }
    }
}

impl QuotaBackoff {
    /// Create a backoff with the given slice, clamped to 1..=60 seconds
    pub fn new(slice: Duration) -> Self {
        let slice = slice.clamp(Duration::from_secs(1), MAX_SLICE);
        debug!(?slice, "QuotaBackoff::new: called");
        Self {
            slice,
            ..Self::default()
        }
    }

    /// Read deadlines from `clock` instead of the system clock
    pub fn with_clock(mut self, clock: Arc<dyn WallClock>) -> Self {
        debug!(?clock, "QuotaBackoff::with_clock: called");
        self.clock = clock;
        self
    }

    pub fn slice(&self) -> Duration {
        self.slice
    }

    /// Wait until `seconds` from now have elapsed on the wall clock
    pub async fn wait_until(&self, seconds: u64) {
        debug!(seconds, slice = ?self.slice, "QuotaBackoff::wait_until: called");
        let start = self.clock.now();
        let deadline = offset(start, seconds)
            .or_else(|| offset(start, UNBOUNDED_WAIT_SECS))
            .unwrap_or(start);
        info!("Waiting until {} for quota reset...", deadline.format("%H:%M:%S"));

        loop {
            // A negative remainder means the deadline has passed
            let Ok(remaining) = (deadline - self.clock.now()).to_std() else {
                break;
            };
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(remaining.min(self.slice)).await;
            debug!(?remaining, "QuotaBackoff::wait_until: slice elapsed");
        }

        info!("Quota wait finished");
    }
}

fn offset(start: DateTime<Local>, seconds: u64) -> Option<DateTime<Local>> {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| start.checked_add_signed(delta))
}
