//! 68-point facial landmark sets

use serde::{Deserialize, Serialize};
use crate::DmsError;

/// Number of points in the landmark scheme
pub const LANDMARK_COUNT: usize = 68;

/// Fixed indices into the 68-point scheme
pub mod indices {
    /// Left eye contour: outer corner, two upper lid points, inner corner, two lower lid points
    pub const LEFT_EYE: [usize; 6] = [36, 37, 38, 39, 40, 41];
    /// Right eye contour, same ordering as [`LEFT_EYE`]
    pub const RIGHT_EYE: [usize; 6] = [42, 43, 44, 45, 46, 47];

    pub const MOUTH_LEFT_CORNER: usize = 48;
    pub const MOUTH_RIGHT_CORNER: usize = 54;
    pub const UPPER_LIP_LEFT: usize = 50;
    pub const UPPER_LIP_RIGHT: usize = 52;
    pub const LOWER_LIP_RIGHT: usize = 56;
    pub const LOWER_LIP_LEFT: usize = 58;
}

/// 2-D point in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Uniformly scale both coordinates
    pub fn scaled(&self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Point::new(x, y)
    }
}

/// Landmark points for one detected face.
///
/// Only constructible through [`LandmarkSet::new`], so every set the
/// classifier sees has at least [`LANDMARK_COUNT`] finite points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    /// Validate and wrap a landmark point list
    pub fn new(points: Vec<Point>) -> Result<Self, DmsError> {
        if points.len() < LANDMARK_COUNT {
            return Err(DmsError::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual: points.len(),
            });
        }

        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(DmsError::NonFiniteLandmark(index));
        }

        Ok(Self { points })
    }

    /// Point at a fixed landmark index
    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    /// Six points at the given indices, in order
    pub fn contour(&self, idx: [usize; 6]) -> [Point; 6] {
        idx.map(|i| self.points[i])
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Copy of this set with every coordinate multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> LandmarkSet {
        LandmarkSet {
            points: self.points.iter().map(|p| p.scaled(factor)).collect(),
        }
    }
}

impl TryFrom<Vec<[f64; 2]>> for LandmarkSet {
    type Error = DmsError;

    fn try_from(raw: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        LandmarkSet::new(raw.into_iter().map(Point::from).collect())
    }
}

impl<'de> Deserialize<'de> for LandmarkSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            points: Vec<Point>,
        }

        let raw = Raw::deserialize(deserializer)?;
        LandmarkSet::new(raw.points).map_err(serde::de::Error::custom)
    }
}
