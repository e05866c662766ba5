//! Observation Sinks
//!
//! Destinations for classified frames:
//! - Combined CSV log (one row per frame)
//! - Yawning CSV log (one row per confirmed yawn)
//! - JSON-lines log (input for episode screening)
//! - Bounded in-memory log
//! - Fan-out to several sinks
//!
//! Sink failures are recoverable; the caller logs them and keeps classifying.

mod csv;
mod fanout;
mod jsonl;
mod memory;

pub use csv::{driver_status, format_timestamp, CombinedCsvSink, YawnCsvSink, COMBINED_HEADER, YAWN_HEADER};
pub use fanout::FanoutSink;
pub use jsonl::{read_observations, JsonLinesSink};
pub use memory::ObservationLog;

use dms::Observation;
use thiserror::Error;

/// Sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("{failed} of {total} sinks failed: {}", .reasons.join("; "))]
    Partial {
        failed: usize,
        total: usize,
        reasons: Vec<String>,
    },
}

/// Consumer of classified frames
pub trait ObservationSink {
    /// Accept one observation
    fn accept(&mut self, observation: &Observation) -> Result<(), SinkError>;

    /// Flush buffered output
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: ObservationSink + ?Sized> ObservationSink for Box<S> {
    fn accept(&mut self, observation: &Observation) -> Result<(), SinkError> {
        (**self).accept(observation)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}
