//! Per-frame classification results

use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::state::AlertnessState;
use crate::timer::Timestamp;
use crate::yawn::YawnEvent;

/// One classified frame. Exactly one is produced per input frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Caller-supplied frame time
    pub timestamp: Timestamp,

    /// Whether a usable face was measured this frame
    pub face_detected: bool,

    /// Left eye aspect ratio (0 when no face)
    pub left_ear: f64,

    /// Right eye aspect ratio (0 when no face)
    pub right_ear: f64,

    /// Lip aspect ratio (0 when no face)
    pub lar: f64,

    /// 0-100 drowsiness percentage
    pub alertness_percent: f64,

    /// Awake, Drowsy or Asleep. Awake on no-face frames.
    pub state: AlertnessState,

    /// Length of the current both-eyes-closed run
    pub closed_duration: Duration,

    /// A yawn was confirmed on this frame
    pub yawn: bool,

    /// The confirmed yawn, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yawn_event: Option<YawnEvent>,

    /// Yawns confirmed so far this session
    pub yawn_count: u32,
}

impl Observation {
    /// Default record for a frame without a usable face
    pub fn no_face(timestamp: Timestamp, yawn_count: u32) -> Self {
        Self {
            timestamp,
            face_detected: false,
            left_ear: 0.0,
            right_ear: 0.0,
            lar: 0.0,
            alertness_percent: 0.0,
            state: AlertnessState::Awake,
            closed_duration: Duration::ZERO,
            yawn: false,
            yawn_event: None,
            yawn_count,
        }
    }

    /// Drowsy, asleep or yawning
    pub fn has_alerts(&self) -> bool {
        self.state.is_alert() || self.yawn
    }
}
