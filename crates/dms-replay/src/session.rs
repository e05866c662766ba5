//! One classification session: classifier, sinks and episode screening

use dms::{DmsConfig, FaceDetector, FrameClassifier, LandmarkPredictor, Observation, Timestamp};
use episode_screen::{DrowsinessEpisode, EpisodeScreener, ScreenConfig};
use metrics::counter;
use observation_sink::ObservationSink;
use serde::Serialize;
use tracing::{debug, warn};

/// Running totals for a session
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayStats {
    pub frames: u64,
    pub no_face_frames: u64,
    pub alert_frames: u64,
    pub yawns: u32,
    pub skipped_frames: u64,
    pub sink_failures: u64,
    pub episodes: Vec<DrowsinessEpisode>,
}

/// Drives frames through the classifier into a sink.
///
/// Sink failures are logged and counted; they never stop the session.
pub struct ReplaySession<D, P, S> {
    classifier: FrameClassifier,
    detector: D,
    predictor: P,
    sink: S,
    screener: EpisodeScreener,
    stats: ReplayStats,
}

impl<D, P, S> ReplaySession<D, P, S>
where
    S: ObservationSink,
{
    pub fn new(
        config: DmsConfig,
        screen: ScreenConfig,
        detector: D,
        predictor: P,
        sink: S,
    ) -> Result<Self, anyhow::Error> {
        Ok(Self {
            classifier: FrameClassifier::new(config)?,
            detector,
            predictor,
            sink,
            screener: EpisodeScreener::new(screen)?,
            stats: ReplayStats::default(),
        })
    }

    /// Classify one frame and deliver the observation.
    ///
    /// Returns `None` when the frame was rejected (out of order).
    pub fn process<F>(&mut self, frame: &F, now: Timestamp) -> Option<Observation>
    where
        D: FaceDetector<F>,
        P: LandmarkPredictor<F>,
    {
        let observation = match self.classifier.classify_frame(
            &mut self.detector,
            &mut self.predictor,
            frame,
            now,
        ) {
            Ok(observation) => observation,
            Err(e) => {
                warn!("Skipping frame: {}", e);
                self.stats.skipped_frames += 1;
                counter!("dms_skipped_frames_total").increment(1);
                return None;
            }
        };

        self.record(&observation);

        if let Err(e) = self.sink.accept(&observation) {
            warn!(timestamp = %observation.timestamp, "Sink rejected observation: {}", e);
            self.stats.sink_failures += 1;
            counter!("dms_sink_failures_total").increment(1);
        }

        if let Some(episode) = self.screener.push(&observation) {
            self.stats.episodes.push(episode);
        }

        Some(observation)
    }

    fn record(&mut self, observation: &Observation) {
        self.stats.frames += 1;
        counter!("dms_frames_total").increment(1);

        if !observation.face_detected {
            self.stats.no_face_frames += 1;
        }
        if observation.state.is_alert() {
            self.stats.alert_frames += 1;
        }
        if observation.yawn {
            counter!("dms_yawn_events_total").increment(1);
        }
        self.stats.yawns = observation.yawn_count;

        debug!(
            timestamp = %observation.timestamp,
            state = ?observation.state,
            percent = observation.alertness_percent,
            yawn = observation.yawn,
            "Frame classified"
        );
    }

    /// Flush the sink and close any open drowsy run
    pub fn finish(mut self) -> (ReplayStats, S) {
        if let Err(e) = self.sink.flush() {
            warn!("Sink flush failed: {}", e);
            self.stats.sink_failures += 1;
            counter!("dms_sink_failures_total").increment(1);
        }
        if let Some(episode) = self.screener.finish() {
            self.stats.episodes.push(episode);
        }
        (self.stats, self.sink)
    }
}
