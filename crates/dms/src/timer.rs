//! Caller-supplied timestamps and continuous-run timers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Frame timestamp in nanoseconds, supplied by the caller's clock.
///
/// May be monotonic or Unix-epoch based; only differences matter to the
/// classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    /// From fractional seconds; negative and NaN inputs clamp to zero
    pub fn from_secs_f64(secs: f64) -> Self {
        let nanos = (secs * 1e9).round();
        if nanos.is_nan() || nanos <= 0.0 {
            Self(0)
        } else if nanos >= u64::MAX as f64 {
            Self(u64::MAX)
        } else {
            Self(nanos as u64)
        }
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000_000
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    pub fn saturating_duration_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}s", self.0 / 1_000_000_000, self.0 % 1_000_000_000)
    }
}

/// Timer for a boolean condition that must hold continuously.
///
/// `Idle` and `Running` are distinct states so a reset can never be
/// confused with an accumulating run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosureTimer {
    #[default]
    Idle,
    Running {
        since: Timestamp,
    },
}

impl ClosureTimer {
    /// Advance with this frame's condition and return the current run length.
    ///
    /// A false condition ends the run immediately and reports zero.
    pub fn update(&mut self, condition: bool, now: Timestamp) -> Duration {
        if condition {
            self.start(now);
            self.elapsed(now)
        } else {
            self.reset();
            Duration::ZERO
        }
    }

    /// Begin a run at `now` unless one is already running
    pub fn start(&mut self, now: Timestamp) {
        if let ClosureTimer::Idle = self {
            *self = ClosureTimer::Running { since: now };
        }
    }

    /// End the current run, returning its length if one was running
    pub fn stop(&mut self, now: Timestamp) -> Option<Duration> {
        match std::mem::take(self) {
            ClosureTimer::Running { since } => Some(now.saturating_duration_since(since)),
            ClosureTimer::Idle => None,
        }
    }

    /// Length of the current run, zero when idle
    pub fn elapsed(&self, now: Timestamp) -> Duration {
        match self {
            ClosureTimer::Running { since } => now.saturating_duration_since(*since),
            ClosureTimer::Idle => Duration::ZERO,
        }
    }

    pub fn reset(&mut self) {
        *self = ClosureTimer::Idle;
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ClosureTimer::Running { .. })
    }

    pub fn since(&self) -> Option<Timestamp> {
        match self {
            ClosureTimer::Running { since } => Some(*since),
            ClosureTimer::Idle => None,
        }
    }
}
