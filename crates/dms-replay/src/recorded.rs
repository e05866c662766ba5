//! Recorded landmark frames
//!
//! Each input line is one frame:
//! `{"timestamp_ms": 1700000000000, "faces": [[[x, y], ... 68 points], ...]}`
//!
//! Faces appear in the order the recording detector reported them.

use dms::{DmsError, FaceDetector, FaceRegion, FrameSource, LandmarkPredictor, LandmarkSet, Timestamp};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::debug;

/// One recorded frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Capture time, Unix epoch milliseconds
    pub timestamp_ms: u64,
    /// Raw landmark points per detected face
    #[serde(default)]
    pub faces: Vec<Vec<[f64; 2]>>,
}

impl RecordedFrame {
    pub fn timestamp(&self) -> Timestamp {
        Timestamp::from_millis(self.timestamp_ms)
    }
}

/// Bounding box of a recorded face's points
fn bounding_box(points: &[[f64; 2]]) -> FaceRegion {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for [x, y] in points {
        min_x = min_x.min(*x);
        min_y = min_y.min(*y);
        max_x = max_x.max(*x);
        max_y = max_y.max(*y);
    }

    if points.is_empty() {
        return FaceRegion::default();
    }

    FaceRegion {
        x: min_x as f32,
        y: min_y as f32,
        width: (max_x - min_x) as f32,
        height: (max_y - min_y) as f32,
        confidence: 1.0,
    }
}

/// Replays the faces stored in a recorded frame
#[derive(Debug, Default)]
pub struct RecordedDetector;

impl FaceDetector<RecordedFrame> for RecordedDetector {
    fn detect(&mut self, frame: &RecordedFrame) -> Result<Vec<FaceRegion>, DmsError> {
        Ok(frame.faces.iter().map(|f| bounding_box(f)).collect())
    }
}

/// Returns the recorded points of the face a region was built from
#[derive(Debug, Default)]
pub struct RecordedPredictor;

impl LandmarkPredictor<RecordedFrame> for RecordedPredictor {
    fn predict(&mut self, frame: &RecordedFrame, region: &FaceRegion) -> Result<LandmarkSet, DmsError> {
        let face = frame
            .faces
            .iter()
            .find(|f| bounding_box(f) == *region)
            .ok_or_else(|| DmsError::Detection("region does not match a recorded face".into()))?;

        LandmarkSet::try_from(face.clone())
    }
}

/// Pull-based source over a JSON-lines recording
///
/// A read error ends the stream: it is returned once as [`DmsError::Io`],
/// after which the source yields nothing.
pub struct JsonLinesFrameSource<R: BufRead> {
    lines: std::io::Lines<R>,
    line_no: usize,
    failed: bool,
}

impl<R: BufRead> JsonLinesFrameSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            failed: false,
        }
    }
}

impl<R: BufRead> FrameSource for JsonLinesFrameSource<R> {
    type Frame = RecordedFrame;

    fn next_frame(&mut self) -> Option<Result<(RecordedFrame, Timestamp), DmsError>> {
        if self.failed {
            return None;
        }

        loop {
            let next = self.lines.next()?;
            self.line_no += 1;
            let line = match next {
                Ok(line) => line,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(DmsError::Io(e)));
                }
            };

            if line.trim().is_empty() {
                debug!(line = self.line_no, "Skipping blank line");
                continue;
            }

            return Some(
                serde_json::from_str::<RecordedFrame>(&line)
                    .map(|frame| {
                        let ts = frame.timestamp();
                        (frame, ts)
                    })
                    .map_err(|e| DmsError::Source(format!("line {}: {}", self.line_no, e))),
            );
        }
    }
}
