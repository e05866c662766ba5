//! Frame-synchronous facial state classification

use metrics::counter;
use tracing::{debug, info, warn};
use crate::detector::{FaceDetector, LandmarkPredictor};
use crate::eye::EyeStateTracker;
use crate::geometry::{FaceRatios, GeometryExtractor};
use crate::landmarks::LandmarkSet;
use crate::observation::Observation;
use crate::timer::Timestamp;
use crate::yawn::YawnStateTracker;
use crate::{DmsConfig, DmsError};

/// Turns per-frame landmark sets into debounced observations.
///
/// Frames must arrive one at a time in timestamp order. The classifier
/// does no I/O and holds no locks; all state lives in the two trackers.
pub struct FrameClassifier {
    config: DmsConfig,
    extractor: GeometryExtractor,
    eyes: EyeStateTracker,
    yawns: YawnStateTracker,
    last_timestamp: Option<Timestamp>,
}

impl FrameClassifier {
    /// Create a classifier, rejecting unusable configuration
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        info!(?config, "Creating frame classifier");

        Ok(Self {
            extractor: GeometryExtractor::new(config.min_span_px),
            eyes: EyeStateTracker::new(&config),
            yawns: YawnStateTracker::new(&config),
            last_timestamp: None,
            config,
        })
    }

    /// Classify one frame from its detected faces, in detector order.
    ///
    /// Only the first face is used. An empty slice, or a first face whose
    /// geometry is degenerate, produces the no-face observation and resets
    /// both trackers.
    pub fn classify(
        &mut self,
        faces: &[LandmarkSet],
        now: Timestamp,
    ) -> Result<Observation, DmsError> {
        self.check_order(now)?;

        let Some(face) = faces.first() else {
            return Ok(self.face_lost(now));
        };

        match self.extractor.extract(face).ratios() {
            Some(ratios) => Ok(self.update(ratios, now)),
            None => {
                debug!(%now, "Degenerate face geometry, treating as no face");
                Ok(self.face_lost(now))
            }
        }
    }

    /// Run detection and landmark prediction on a raw frame, then classify.
    ///
    /// Detector and predictor failures count as a frame with no face.
    pub fn classify_frame<F, D, P>(
        &mut self,
        detector: &mut D,
        predictor: &mut P,
        frame: &F,
        now: Timestamp,
    ) -> Result<Observation, DmsError>
    where
        D: FaceDetector<F>,
        P: LandmarkPredictor<F>,
    {
        let faces = match detector.detect(frame) {
            Ok(regions) => regions,
            Err(e) => {
                warn!(%now, "Face detection failed: {}", e);
                counter!("dms_detector_failures_total").increment(1);
                Vec::new()
            }
        };

        let landmarks = match faces.first() {
            Some(region) => match predictor.predict(frame, region) {
                Ok(set) => vec![set],
                Err(e) => {
                    warn!(%now, "Landmark prediction failed: {}", e);
                    counter!("dms_detector_failures_total").increment(1);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        self.classify(&landmarks, now)
    }

    fn update(&mut self, ratios: FaceRatios, now: Timestamp) -> Observation {
        let eyes = self.eyes.observe(ratios.left_ear, ratios.right_ear, now);
        let yawn_event = self.yawns.observe(ratios.avg_ear(), ratios.lar, now);

        if let Some(event) = &yawn_event {
            info!(
                sequence = event.sequence,
                intensity = event.intensity_percent,
                "Yawn detected"
            );
        }

        Observation {
            timestamp: now,
            face_detected: true,
            left_ear: ratios.left_ear,
            right_ear: ratios.right_ear,
            lar: ratios.lar,
            alertness_percent: eyes.alertness_percent,
            state: eyes.state,
            closed_duration: eyes.closed_duration,
            yawn: yawn_event.is_some(),
            yawn_event,
            yawn_count: self.yawns.count(),
        }
    }

    fn face_lost(&mut self, now: Timestamp) -> Observation {
        self.eyes.reset();
        self.yawns.reset();
        Observation::no_face(now, self.yawns.count())
    }

    fn check_order(&mut self, now: Timestamp) -> Result<(), DmsError> {
        if let Some(previous) = self.last_timestamp {
            if now < previous {
                return Err(DmsError::OutOfOrder { previous, current: now });
            }
        }
        self.last_timestamp = Some(now);
        Ok(())
    }

    /// Reset trackers and ordering (on driver change). The yawn count restarts.
    pub fn reset_state(&mut self) {
        self.eyes = EyeStateTracker::new(&self.config);
        self.yawns = YawnStateTracker::new(&self.config);
        self.last_timestamp = None;
    }

    /// Yawns confirmed so far this session
    pub fn yawn_count(&self) -> u32 {
        self.yawns.count()
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::FaceRegion;
    use crate::geometry::tests::face_with;
    use crate::landmarks::{Point, LANDMARK_COUNT};
    use crate::state::AlertnessState;
    use std::time::Duration;

    fn at(secs: f64) -> Timestamp {
        Timestamp::from_secs_f64(secs)
    }

    fn classifier() -> FrameClassifier {
        FrameClassifier::new(DmsConfig::default()).unwrap()
    }

    /// Feed `face` at 10 Hz over [start, end) and collect observations
    fn feed(
        classifier: &mut FrameClassifier,
        face: &[LandmarkSet],
        start: f64,
        end: f64,
    ) -> Vec<Observation> {
        let frames = ((end - start) * 10.0).round() as usize;
        (0..frames)
            .map(|i| classifier.classify(face, at(start + i as f64 * 0.1)).unwrap())
            .collect()
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = DmsConfig {
            drowsy_time_threshold_ms: 9000,
            ..Default::default()
        };
        assert!(matches!(FrameClassifier::new(config), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_no_face_observation() {
        let mut classifier = classifier();
        let obs = classifier.classify(&[], at(1.0)).unwrap();

        assert!(!obs.face_detected);
        assert_eq!(obs.state, AlertnessState::Awake);
        assert_eq!(obs.left_ear, 0.0);
        assert_eq!(obs.lar, 0.0);
        assert!(!obs.yawn);
    }

    #[test]
    fn test_closed_run_then_reopen() {
        let mut classifier = classifier();
        let open = [face_with(0.25, 0.25, 0.3)];
        let closed = [face_with(0.15, 0.15, 0.3)];

        let awake = feed(&mut classifier, &open, 0.0, 2.0);
        assert!(awake.iter().all(|o| o.state == AlertnessState::Awake));

        let run = feed(&mut classifier, &closed, 2.0, 6.0);
        for obs in &run {
            let into_run = obs.timestamp.saturating_duration_since(at(2.0));
            let expected = if into_run >= Duration::from_secs(3) {
                AlertnessState::Drowsy
            } else {
                AlertnessState::Awake
            };
            assert_eq!(obs.state, expected, "at {}", obs.timestamp);
        }
        assert_eq!(run.last().unwrap().state, AlertnessState::Drowsy);

        let reopened = classifier.classify(&open, at(6.0)).unwrap();
        assert_eq!(reopened.state, AlertnessState::Awake);
        assert_eq!(reopened.closed_duration, Duration::ZERO);
        assert_eq!(reopened.alertness_percent, 0.0);
    }

    #[test]
    fn test_face_loss_abandons_closed_run() {
        let mut classifier = classifier();
        let closed = [face_with(0.15, 0.15, 0.3)];

        let run = feed(&mut classifier, &closed, 0.0, 4.0);
        assert_eq!(run.last().unwrap().state, AlertnessState::Drowsy);

        for i in 0..5 {
            let obs = classifier.classify(&[], at(4.0 + i as f64 * 0.1)).unwrap();
            assert!(!obs.face_detected);
        }

        let restarted = classifier.classify(&closed, at(4.5)).unwrap();
        assert_eq!(restarted.closed_duration, Duration::ZERO);
        assert_eq!(restarted.state, AlertnessState::Awake);

        let later = classifier.classify(&closed, at(6.5)).unwrap();
        assert_eq!(later.closed_duration, Duration::from_secs(2));
        assert_eq!(later.state, AlertnessState::Awake);
    }

    #[test]
    fn test_sustained_yawn_reports_once() {
        let mut classifier = classifier();
        let yawning = [face_with(0.05, 0.05, 0.8)];
        let neutral = [face_with(0.3, 0.3, 0.2)];

        let during = feed(&mut classifier, &yawning, 0.0, 3.5);
        assert!(during.iter().all(|o| !o.yawn));

        let end = classifier.classify(&neutral, at(3.5)).unwrap();
        assert!(end.yawn);
        assert_eq!(end.yawn_count, 1);
        let event = end.yawn_event.unwrap();
        assert_eq!(event.intensity_percent, 100.0);

        let after = feed(&mut classifier, &neutral, 3.6, 5.0);
        assert!(after.iter().all(|o| !o.yawn && o.yawn_count == 1));
    }

    #[test]
    fn test_drowsy_and_yawn_on_same_frame() {
        let mut classifier = classifier();
        // Both eyes well closed and mouth wide open: both trackers run
        let yawning = [face_with(0.05, 0.05, 0.8)];
        let closed_mouth = [face_with(0.05, 0.05, 0.2)];

        feed(&mut classifier, &yawning, 0.0, 4.0);
        let obs = classifier.classify(&closed_mouth, at(4.0)).unwrap();

        assert_eq!(obs.state, AlertnessState::Drowsy);
        assert!(obs.yawn);
    }

    #[test]
    fn test_face_loss_discards_yawn_in_progress() {
        let mut classifier = classifier();
        let yawning = [face_with(0.05, 0.05, 0.8)];
        let neutral = [face_with(0.3, 0.3, 0.2)];

        feed(&mut classifier, &yawning, 0.0, 4.0);
        classifier.classify(&[], at(4.0)).unwrap();
        let obs = classifier.classify(&neutral, at(4.1)).unwrap();

        assert!(!obs.yawn);
        assert_eq!(obs.yawn_count, 0);
    }

    #[test]
    fn test_degenerate_geometry_counts_as_no_face() {
        let mut classifier = classifier();
        let closed = [face_with(0.15, 0.15, 0.3)];
        feed(&mut classifier, &closed, 0.0, 4.0);

        let collapsed = LandmarkSet::new(vec![Point::new(1.0, 1.0); LANDMARK_COUNT]).unwrap();
        let obs = classifier.classify(&[collapsed], at(4.0)).unwrap();
        assert!(!obs.face_detected);
        assert_eq!(obs.state, AlertnessState::Awake);

        let next = classifier.classify(&closed, at(4.1)).unwrap();
        assert_eq!(next.closed_duration, Duration::ZERO);
    }

    #[test]
    fn test_first_face_wins() {
        let mut classifier = classifier();
        let faces = [face_with(0.3, 0.3, 0.2), face_with(0.1, 0.1, 0.9)];
        let obs = classifier.classify(&faces, at(0.0)).unwrap();
        assert!((obs.left_ear - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_order_frame_rejected_without_state_change() {
        let mut classifier = classifier();
        let closed = [face_with(0.15, 0.15, 0.3)];
        classifier.classify(&closed, at(0.0)).unwrap();
        classifier.classify(&closed, at(3.0)).unwrap();

        let err = classifier.classify(&closed, at(1.0)).unwrap_err();
        assert!(matches!(err, DmsError::OutOfOrder { .. }));

        let obs = classifier.classify(&closed, at(3.5)).unwrap();
        assert_eq!(obs.closed_duration, Duration::from_millis(3500));
    }

    struct StubFrame {
        faces: usize,
    }

    struct StubDetector {
        fail: bool,
    }

    impl FaceDetector<StubFrame> for StubDetector {
        fn detect(&mut self, frame: &StubFrame) -> Result<Vec<FaceRegion>, DmsError> {
            if self.fail {
                return Err(DmsError::Detection("camera glitch".into()));
            }
            Ok(vec![FaceRegion::default(); frame.faces])
        }
    }

    struct StubPredictor {
        calls: usize,
        fail: bool,
    }

    impl LandmarkPredictor<StubFrame> for StubPredictor {
        fn predict(&mut self, _frame: &StubFrame, _region: &FaceRegion) -> Result<LandmarkSet, DmsError> {
            self.calls += 1;
            if self.fail {
                return Err(DmsError::Detection("landmark model timeout".into()));
            }
            Ok(face_with(0.15, 0.15, 0.3))
        }
    }

    #[test]
    fn test_classify_frame_predicts_first_face_only() {
        let mut classifier = classifier();
        let mut detector = StubDetector { fail: false };
        let mut predictor = StubPredictor { calls: 0, fail: false };

        let obs = classifier
            .classify_frame(&mut detector, &mut predictor, &StubFrame { faces: 3 }, at(0.0))
            .unwrap();
        assert!(obs.face_detected);
        assert_eq!(predictor.calls, 1);
    }

    #[test]
    fn test_detector_failure_is_no_face() {
        let mut classifier = classifier();
        let mut detector = StubDetector { fail: false };
        let mut predictor = StubPredictor { calls: 0, fail: false };
        let frame = StubFrame { faces: 1 };

        classifier.classify_frame(&mut detector, &mut predictor, &frame, at(0.0)).unwrap();
        classifier.classify_frame(&mut detector, &mut predictor, &frame, at(2.0)).unwrap();

        detector.fail = true;
        let obs = classifier
            .classify_frame(&mut detector, &mut predictor, &frame, at(2.1))
            .unwrap();
        assert!(!obs.face_detected);

        detector.fail = false;
        let obs = classifier
            .classify_frame(&mut detector, &mut predictor, &frame, at(4.0))
            .unwrap();
        assert_eq!(obs.closed_duration, Duration::ZERO);
    }

    #[test]
    fn test_predictor_failure_is_no_face() {
        let mut classifier = classifier();
        let mut detector = StubDetector { fail: false };
        let mut predictor = StubPredictor { calls: 0, fail: false };
        let frame = StubFrame { faces: 1 };

        classifier.classify_frame(&mut detector, &mut predictor, &frame, at(0.0)).unwrap();
        let obs = classifier
            .classify_frame(&mut detector, &mut predictor, &frame, at(2.0))
            .unwrap();
        assert_eq!(obs.closed_duration, Duration::from_secs(2));

        predictor.fail = true;
        let obs = classifier
            .classify_frame(&mut detector, &mut predictor, &frame, at(2.1))
            .unwrap();
        assert!(!obs.face_detected);
        assert_eq!(obs.state, AlertnessState::Awake);

        predictor.fail = false;
        let obs = classifier
            .classify_frame(&mut detector, &mut predictor, &frame, at(4.0))
            .unwrap();
        assert!(obs.face_detected);
        assert_eq!(obs.closed_duration, Duration::ZERO);
        assert_eq!(predictor.calls, 4);
    }

    #[test]
    fn test_reset_state_restarts_session() {
        let mut classifier = classifier();
        let yawning = [face_with(0.05, 0.05, 0.8)];
        let neutral = [face_with(0.3, 0.3, 0.2)];
        feed(&mut classifier, &yawning, 0.0, 3.5);
        classifier.classify(&neutral, at(3.5)).unwrap();
        assert_eq!(classifier.yawn_count(), 1);

        classifier.reset_state();
        assert_eq!(classifier.yawn_count(), 0);
        assert!(classifier.classify(&neutral, at(0.0)).is_ok());
    }
}
