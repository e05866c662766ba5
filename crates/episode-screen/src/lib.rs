//! Drowsiness Episode Screening
//!
//! Scans an ordered stream of DMS observations for sustained drowsiness:
//! runs of consecutive drowsy frames long enough to be worth reporting.
//! Each qualifying run becomes one episode, keyed by its first frame, so a
//! long run is never reported more than once.

use dms::{AlertnessState, Observation, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Screening error types
#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Episode severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Medium,
    High,
    Critical,
}

/// A sustained drowsiness episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrowsinessEpisode {
    /// Timestamp of the first frame of the run
    pub start: Timestamp,
    /// Timestamp of the last frame of the run
    pub end: Timestamp,
    /// Consecutive matching frames
    pub frames: usize,
    /// Highest drowsiness percentage seen during the run
    pub peak_percent: f64,
    /// Whether any frame of the run was Asleep
    pub reached_asleep: bool,
    pub severity: Severity,
}

/// Screening configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Minimum consecutive drowsy frames for an episode
    pub min_consecutive: usize,
    /// Count Asleep frames as part of a drowsy run
    pub include_asleep: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            min_consecutive: 10,
            include_asleep: false,
        }
    }
}

impl ScreenConfig {
    pub fn validate(&self) -> Result<(), ScreenError> {
        if self.min_consecutive == 0 {
            return Err(ScreenError::Config(
                "min_consecutive must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn matches(&self, observation: &Observation) -> bool {
        if !observation.face_detected {
            return false;
        }
        match observation.state {
            AlertnessState::Drowsy => true,
            AlertnessState::Asleep => self.include_asleep,
            AlertnessState::Awake => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Run {
    start: Timestamp,
    end: Timestamp,
    frames: usize,
    peak_percent: f64,
    reached_asleep: bool,
}

impl Run {
    fn begin(observation: &Observation) -> Self {
        Self {
            start: observation.timestamp,
            end: observation.timestamp,
            frames: 1,
            peak_percent: observation.alertness_percent,
            reached_asleep: observation.state == AlertnessState::Asleep,
        }
    }

    fn extend(&mut self, observation: &Observation) {
        self.end = observation.timestamp;
        self.frames += 1;
        self.peak_percent = self.peak_percent.max(observation.alertness_percent);
        self.reached_asleep |= observation.state == AlertnessState::Asleep;
    }

    fn into_episode(self) -> DrowsinessEpisode {
        let severity = if self.reached_asleep {
            Severity::Critical
        } else if self.peak_percent >= 50.0 {
            Severity::High
        } else {
            Severity::Medium
        };

        DrowsinessEpisode {
            start: self.start,
            end: self.end,
            frames: self.frames,
            peak_percent: self.peak_percent,
            reached_asleep: self.reached_asleep,
            severity,
        }
    }
}

/// Streaming episode screener.
///
/// An episode is emitted when its run ends; call [`finish`](Self::finish)
/// at end of input to flush a run that is still open.
pub struct EpisodeScreener {
    config: ScreenConfig,
    run: Option<Run>,
    episodes: usize,
}

impl EpisodeScreener {
    pub fn new(config: ScreenConfig) -> Result<Self, ScreenError> {
        config.validate()?;
        Ok(Self {
            config,
            run: None,
            episodes: 0,
        })
    }

    /// Feed the next observation in order
    pub fn push(&mut self, observation: &Observation) -> Option<DrowsinessEpisode> {
        if self.config.matches(observation) {
            match &mut self.run {
                Some(run) => run.extend(observation),
                None => self.run = Some(Run::begin(observation)),
            }
            return None;
        }

        self.close()
    }

    /// End of input
    pub fn finish(&mut self) -> Option<DrowsinessEpisode> {
        self.close()
    }

    /// Episodes reported so far
    pub fn episode_count(&self) -> usize {
        self.episodes
    }

    fn close(&mut self) -> Option<DrowsinessEpisode> {
        let run = self.run.take()?;
        if run.frames < self.config.min_consecutive {
            debug!(frames = run.frames, "Drowsy run too short");
            return None;
        }

        self.episodes += 1;
        let episode = run.into_episode();
        info!(
            start = %episode.start,
            frames = episode.frames,
            severity = ?episode.severity,
            "Drowsiness episode"
        );
        Some(episode)
    }
}

/// Screen a complete, ordered observation log
pub fn screen(
    observations: &[Observation],
    config: ScreenConfig,
) -> Result<Vec<DrowsinessEpisode>, ScreenError> {
    let mut screener = EpisodeScreener::new(config)?;
    let mut episodes: Vec<_> = observations
        .iter()
        .filter_map(|o| screener.push(o))
        .collect();
    episodes.extend(screener.finish());
    Ok(episodes)
}
