//! Collaborator interfaces for face detection, landmark prediction and frame input

use serde::{Deserialize, Serialize};
use crate::landmarks::LandmarkSet;
use crate::timer::Timestamp;
use crate::DmsError;

/// Face bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

/// Finds candidate faces in a frame. May return none.
pub trait FaceDetector<F> {
    fn detect(&mut self, frame: &F) -> Result<Vec<FaceRegion>, DmsError>;
}

/// Places the 68 landmarks inside a detected face region
pub trait LandmarkPredictor<F> {
    fn predict(&mut self, frame: &F, region: &FaceRegion) -> Result<LandmarkSet, DmsError>;
}

/// Pull-based frame input. Frames must be yielded in arrival order.
pub trait FrameSource {
    type Frame;

    /// Next frame with its capture time, `None` at end of stream
    fn next_frame(&mut self) -> Option<Result<(Self::Frame, Timestamp), DmsError>>;
}
