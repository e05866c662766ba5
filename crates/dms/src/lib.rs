//! Driver Monitoring System (DMS)
//!
//! Real-time facial state classification from 68-point face landmarks:
//! - Eye and lip aspect ratios
//! - Eye closure timing (awake / drowsy / asleep)
//! - Debounced yawn events
//!
//! Face detection and landmark prediction are external; see [`detector`].

pub mod classifier;
pub mod config;
pub mod detector;
pub mod eye;
pub mod geometry;
pub mod landmarks;
pub mod observation;
pub mod state;
pub mod timer;
pub mod yawn;

pub use classifier::FrameClassifier;
pub use config::DmsConfig;
pub use detector::{FaceDetector, FaceRegion, FrameSource, LandmarkPredictor};
pub use eye::{EyeReading, EyeStateTracker};
pub use geometry::{FaceGeometry, FaceRatios, GeometryExtractor};
pub use landmarks::{LandmarkSet, Point, LANDMARK_COUNT};
pub use observation::Observation;
pub use state::AlertnessState;
pub use timer::{ClosureTimer, Timestamp};
pub use yawn::{YawnEvent, YawnStateTracker};

use thiserror::Error;

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Landmark set has {actual} points, expected at least {expected}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Landmark {0} has a non-finite coordinate")]
    NonFiniteLandmark(usize),

    #[error("Frame at {current} arrived after frame at {previous}")]
    OutOfOrder {
        previous: Timestamp,
        current: Timestamp,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Frame source error: {0}")]
    Source(String),

    #[error("Input read failed: {0}")]
    Io(#[from] std::io::Error),
}
