//! Eye closure tracking

use std::time::Duration;
use crate::config::DmsConfig;
use crate::state::AlertnessState;
use crate::timer::{ClosureTimer, Timestamp};

/// Result of one eye-tracker update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeReading {
    /// Both eyes below the EAR threshold this frame
    pub both_closed: bool,
    /// Length of the current closed run
    pub closed_duration: Duration,
    pub state: AlertnessState,
    /// 0-100, linear between the drowsy and sleep thresholds
    pub alertness_percent: f64,
}

/// Tracks how long both eyes have been continuously closed
#[derive(Debug, Clone)]
pub struct EyeStateTracker {
    ear_threshold: f64,
    drowsy: Duration,
    sleep: Duration,
    timer: ClosureTimer,
}

impl EyeStateTracker {
    pub fn new(config: &DmsConfig) -> Self {
        Self {
            ear_threshold: config.ear_threshold,
            drowsy: config.drowsy_time_threshold(),
            sleep: config.sleep_time_threshold(),
            timer: ClosureTimer::Idle,
        }
    }

    /// Feed one frame's eye aspect ratios
    pub fn observe(&mut self, left_ear: f64, right_ear: f64, now: Timestamp) -> EyeReading {
        let both_closed = left_ear < self.ear_threshold && right_ear < self.ear_threshold;
        let closed_duration = self.timer.update(both_closed, now);
        let (state, alertness_percent) =
            AlertnessState::from_closed_duration(closed_duration, self.drowsy, self.sleep);

        EyeReading {
            both_closed,
            closed_duration,
            state,
            alertness_percent,
        }
    }

    /// Abandon the current run (face lost)
    pub fn reset(&mut self) {
        self.timer.reset();
    }

    pub fn closed_since(&self) -> Option<Timestamp> {
        self.timer.since()
    }
}
