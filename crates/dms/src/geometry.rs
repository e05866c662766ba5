//! Eye and lip aspect ratios from landmark geometry

use serde::{Deserialize, Serialize};
use crate::landmarks::{indices, LandmarkSet, Point};

/// Denominator spans below this (pixels) make a ratio undefined
pub const DEGENERATE_SPAN_PX: f64 = 1e-3;

/// Raw ratios for one face. `None` marks a ratio whose denominator was degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceGeometry {
    pub left_ear: Option<f64>,
    pub right_ear: Option<f64>,
    pub lar: Option<f64>,
}

impl FaceGeometry {
    /// All three ratios, if every one is defined
    pub fn ratios(&self) -> Option<FaceRatios> {
        Some(FaceRatios {
            left_ear: self.left_ear?,
            right_ear: self.right_ear?,
            lar: self.lar?,
        })
    }
}

/// Fully defined ratios for one face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceRatios {
    pub left_ear: f64,
    pub right_ear: f64,
    pub lar: f64,
}

impl FaceRatios {
    /// Mean of both eye aspect ratios
    pub fn avg_ear(&self) -> f64 {
        (self.left_ear + self.right_ear) / 2.0
    }
}

/// Converts landmark sets into aspect ratios
#[derive(Debug, Clone, Copy)]
pub struct GeometryExtractor {
    min_span_px: f64,
}

impl Default for GeometryExtractor {
    fn default() -> Self {
        Self::new(DEGENERATE_SPAN_PX)
    }
}

impl GeometryExtractor {
    pub fn new(min_span_px: f64) -> Self {
        Self { min_span_px }
    }

    /// Compute left EAR, right EAR and LAR for one face
    pub fn extract(&self, landmarks: &LandmarkSet) -> FaceGeometry {
        FaceGeometry {
            left_ear: self.eye_aspect_ratio(&landmarks.contour(indices::LEFT_EYE)),
            right_ear: self.eye_aspect_ratio(&landmarks.contour(indices::RIGHT_EYE)),
            lar: self.lip_aspect_ratio(landmarks),
        }
    }

    /// EAR = (|p1-p5| + |p2-p4|) / (2 |p0-p3|)
    pub fn eye_aspect_ratio(&self, eye: &[Point; 6]) -> Option<f64> {
        let vertical = eye[1].distance(&eye[5]) + eye[2].distance(&eye[4]);
        let horizontal = eye[0].distance(&eye[3]);
        self.ratio(vertical, horizontal)
    }

    /// LAR = (|a-d| + |b-c|) / (2 |e-f|) over the upper/lower lip pairs and mouth corners
    pub fn lip_aspect_ratio(&self, landmarks: &LandmarkSet) -> Option<f64> {
        let a = landmarks.point(indices::UPPER_LIP_LEFT);
        let b = landmarks.point(indices::UPPER_LIP_RIGHT);
        let c = landmarks.point(indices::LOWER_LIP_RIGHT);
        let d = landmarks.point(indices::LOWER_LIP_LEFT);
        let e = landmarks.point(indices::MOUTH_LEFT_CORNER);
        let f = landmarks.point(indices::MOUTH_RIGHT_CORNER);

        self.ratio(a.distance(&d) + b.distance(&c), e.distance(&f))
    }

    fn ratio(&self, vertical_sum: f64, span: f64) -> Option<f64> {
        if span < self.min_span_px {
            return None;
        }
        Some(vertical_sum / (2.0 * span))
    }
}
