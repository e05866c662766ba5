//! CSV log sinks
//!
//! Combined log columns:
//! `timestamp,left_ear,right_ear,lar,drowsiness_percent,driver_status,yawn`
//!
//! Yawning log columns:
//! `timestamp,total_yawns,yawn_percent`

use chrono::{DateTime, SecondsFormat, Utc};
use dms::{AlertnessState, Observation, Timestamp};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;
use crate::{ObservationSink, SinkError};

pub const COMBINED_HEADER: &str =
    "timestamp,left_ear,right_ear,lar,drowsiness_percent,driver_status,yawn";
pub const YAWN_HEADER: &str = "timestamp,total_yawns,yawn_percent";

/// Human-readable driver status column
pub fn driver_status(observation: &Observation) -> &'static str {
    if !observation.face_detected {
        return "N/A";
    }
    match observation.state {
        AlertnessState::Awake => "Driver Awake",
        AlertnessState::Drowsy => "ALERT: High Drowsiness!",
        AlertnessState::Asleep => "ALERT: Driver Sleeping!",
    }
}

/// RFC 3339 rendering of a Unix-epoch timestamp. Falls back to raw seconds
/// when the value is outside chrono's range.
pub fn format_timestamp(timestamp: Timestamp) -> String {
    let nanos = timestamp.as_nanos();
    let secs = (nanos / 1_000_000_000) as i64;
    let subsec = (nanos % 1_000_000_000) as u32;

    match DateTime::<Utc>::from_timestamp(secs, subsec) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => timestamp.to_string(),
    }
}

fn open_append(path: &Path, header: &str) -> Result<BufWriter<File>, SinkError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let empty = file.metadata()?.len() == 0;

    let mut writer = BufWriter::new(file);
    if empty {
        writeln!(writer, "{header}")?;
        writer.flush()?;
    }
    info!("Appending to {}", path.display());
    Ok(writer)
}

/// One row per observation
pub struct CombinedCsvSink<W: Write> {
    writer: W,
    rows: u64,
}

impl<W: Write> CombinedCsvSink<W> {
    /// Write rows to `writer` without a header
    pub fn new(writer: W) -> Self {
        Self { writer, rows: 0 }
    }

    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Format one combined-log row (no trailing newline)
    pub fn format_row(observation: &Observation) -> String {
        format!(
            "{},{:.3},{:.3},{:.3},{:.1},{},{}",
            format_timestamp(observation.timestamp),
            observation.left_ear,
            observation.right_ear,
            observation.lar,
            observation.alertness_percent,
            driver_status(observation),
            if observation.yawn { "Yes" } else { "No" },
        )
    }
}

impl CombinedCsvSink<BufWriter<File>> {
    /// Append to a file, writing the header if the file is new or empty
    pub fn append(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        Ok(Self::new(open_append(path.as_ref(), COMBINED_HEADER)?))
    }
}

impl<W: Write> ObservationSink for CombinedCsvSink<W> {
    fn accept(&mut self, observation: &Observation) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", Self::format_row(observation))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One row per confirmed yawn; other observations are ignored
pub struct YawnCsvSink<W: Write> {
    writer: W,
}

impl<W: Write> YawnCsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl YawnCsvSink<BufWriter<File>> {
    /// Append to a file, writing the header if the file is new or empty
    pub fn append(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        Ok(Self::new(open_append(path.as_ref(), YAWN_HEADER)?))
    }
}

impl<W: Write> ObservationSink for YawnCsvSink<W> {
    fn accept(&mut self, observation: &Observation) -> Result<(), SinkError> {
        let Some(event) = &observation.yawn_event else {
            return Ok(());
        };

        writeln!(
            self.writer,
            "{},{},{:.1}",
            format_timestamp(observation.timestamp),
            event.sequence,
            event.intensity_percent
        )?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
