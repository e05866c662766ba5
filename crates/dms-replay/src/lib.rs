//! DMS Replay
//!
//! Replays recorded face landmarks through the facial state classifier,
//! writes the resulting observations to the configured logs and screens
//! observation logs for sustained drowsiness.

pub mod cli;
pub mod recorded;
pub mod session;
pub mod settings;

use anyhow::Context;
use episode_screen::{DrowsinessEpisode, EpisodeScreener};
use observation_sink::{
    read_observations, CombinedCsvSink, FanoutSink, JsonLinesSink, SinkError, YawnCsvSink,
};
use std::fs::File;
use std::io::{BufReader, Write};
use tokio::sync::mpsc;
use tracing::{info, info_span, warn, Instrument};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

use cli::{ReplayArgs, ScreenArgs};
use dms::{DmsError, FrameSource};
use recorded::{JsonLinesFrameSource, RecordedDetector, RecordedFrame, RecordedPredictor};
use session::{ReplaySession, ReplayStats};
use settings::{LogSettings, Settings};

/// Frames buffered between the reader and the classifier
pub const FRAME_QUEUE_DEPTH: usize = 64;

/// Initialize logging
pub fn init_logging(settings: &LogSettings, verbose: u8, json: bool) -> anyhow::Result<()> {
    let level = match verbose {
        0 => settings.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json || settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn build_sinks(args: &ReplayArgs) -> anyhow::Result<FanoutSink> {
    let mut sinks = FanoutSink::new();

    if let Some(path) = &args.combined_csv {
        let sink = CombinedCsvSink::append(path)
            .with_context(|| format!("opening {}", path.display()))?;
        sinks.push("combined-csv", sink);
    }
    if let Some(path) = &args.yawn_csv {
        let sink = YawnCsvSink::append(path)
            .with_context(|| format!("opening {}", path.display()))?;
        sinks.push("yawn-csv", sink);
    }
    if let Some(path) = &args.jsonl {
        let sink = JsonLinesSink::append(path)
            .with_context(|| format!("opening {}", path.display()))?;
        sinks.push("jsonl", sink);
    }

    if sinks.is_empty() {
        warn!("No output sinks configured; observations will only be counted");
    }
    Ok(sinks)
}

/// Classify every frame of a recording
pub async fn run_replay(args: &ReplayArgs, settings: &Settings) -> anyhow::Result<ReplayStats> {
    let session_id = Uuid::new_v4();
    let span = info_span!("replay", %session_id);

    async move {
        let file = File::open(&args.input)
            .with_context(|| format!("opening {}", args.input.display()))?;
        let sinks = build_sinks(args)?;
        let mut session = ReplaySession::new(
            settings.classifier.clone(),
            settings.screen.clone(),
            RecordedDetector,
            RecordedPredictor,
            sinks,
        )?;

        info!("Replaying {}", args.input.display());

        let (tx, mut rx) = mpsc::channel::<(RecordedFrame, dms::Timestamp)>(FRAME_QUEUE_DEPTH);
        let reader = tokio::task::spawn_blocking(move || {
            let mut source = JsonLinesFrameSource::new(BufReader::new(file));
            let mut malformed = 0usize;
            while let Some(next) = source.next_frame() {
                match next {
                    Ok(frame) => {
                        if tx.blocking_send(frame).is_err() {
                            break;
                        }
                    }
                    Err(DmsError::Io(e)) => return Err(e),
                    Err(e) => {
                        warn!("Skipping malformed frame: {}", e);
                        malformed += 1;
                    }
                }
            }
            Ok(malformed)
        });

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Interrupted, stopping after the current frame");
                    break;
                }
                next = rx.recv() => match next {
                    Some((frame, now)) => {
                        session.process(&frame, now);
                    }
                    None => break,
                },
            }
        }
        drop(rx);

        let read = reader.await.context("frame reader task failed")?;
        let (mut stats, _) = session.finish();
        let malformed =
            read.with_context(|| format!("reading {}", args.input.display()))?;
        stats.skipped_frames += malformed as u64;

        info!(
            frames = stats.frames,
            no_face = stats.no_face_frames,
            yawns = stats.yawns,
            episodes = stats.episodes.len(),
            skipped = stats.skipped_frames,
            sink_failures = stats.sink_failures,
            "Replay finished"
        );
        Ok(stats)
    }
    .instrument(span)
    .await
}

/// Screen an observation log, writing one JSON line per episode to `out`
pub fn run_screen<W: Write>(
    args: &ScreenArgs,
    settings: &Settings,
    mut out: W,
) -> anyhow::Result<Vec<DrowsinessEpisode>> {
    let mut config = settings.screen.clone();
    if let Some(min) = args.min_consecutive {
        config.min_consecutive = min;
    }
    config.include_asleep |= args.include_asleep;

    let file = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let mut screener = EpisodeScreener::new(config)?;
    let mut episodes = Vec::new();

    for (line, result) in read_observations(BufReader::new(file)).enumerate() {
        match result {
            Ok(observation) => episodes.extend(screener.push(&observation)),
            Err(e @ SinkError::Io(_)) => {
                return Err(e).with_context(|| format!("reading {}", args.input.display()));
            }
            Err(e) => warn!(record = line + 1, "Skipping unreadable observation: {}", e),
        }
    }
    episodes.extend(screener.finish());

    for episode in &episodes {
        serde_json::to_writer(&mut out, episode)?;
        writeln!(out)?;
    }
    out.flush()?;

    info!("Found {} drowsiness episodes", episodes.len());
    Ok(episodes)
}
