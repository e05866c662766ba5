//! Yawn detection with report-at-end debouncing
//!
//! A yawn is a run of frames where the mouth is wide open while the eyes are
//! nearly shut. The event for a run fires once, on the first frame after the
//! run ends, and only if the run lasted at least the configured time. Runs
//! still in progress never fire.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use crate::config::DmsConfig;
use crate::timer::{ClosureTimer, Timestamp};

/// A confirmed yawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YawnEvent {
    /// 1-based position in this session's yawn count
    pub sequence: u32,
    /// Length of the yawn run
    pub duration: Duration,
    /// `duration / threshold * 100`, capped at 100
    pub intensity_percent: f64,
}

/// Tracks mouth-open runs and counts confirmed yawns
#[derive(Debug, Clone)]
pub struct YawnStateTracker {
    lar_threshold: f64,
    ear_gate: f64,
    min_duration: Duration,
    timer: ClosureTimer,
    count: u32,
}

impl YawnStateTracker {
    pub fn new(config: &DmsConfig) -> Self {
        Self {
            lar_threshold: config.yawn_lar_threshold,
            ear_gate: config.yawn_ear_gate,
            min_duration: config.yawn_time_threshold(),
            timer: ClosureTimer::Idle,
            count: 0,
        }
    }

    /// Feed one frame. Returns the event for a run that just ended long enough.
    pub fn observe(&mut self, avg_ear: f64, lar: f64, now: Timestamp) -> Option<YawnEvent> {
        let yawning = lar > self.lar_threshold && avg_ear < self.ear_gate;

        if yawning {
            self.timer.start(now);
            return None;
        }

        let duration = self.timer.stop(now)?;
        if duration < self.min_duration {
            debug!(?duration, "Yawn run too short, discarded");
            return None;
        }

        self.count += 1;
        let intensity_percent =
            (duration.as_secs_f64() / self.min_duration.as_secs_f64() * 100.0).min(100.0);

        Some(YawnEvent {
            sequence: self.count,
            duration,
            intensity_percent,
        })
    }

    /// Length of the run in progress, zero if none
    pub fn current_run(&self, now: Timestamp) -> Duration {
        self.timer.elapsed(now)
    }

    /// Discard any run in progress without crediting it. The count is kept.
    pub fn reset(&mut self) {
        self.timer.reset();
    }

    /// Confirmed yawns so far this session
    pub fn count(&self) -> u32 {
        self.count
    }
}
