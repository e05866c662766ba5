//! Fan-out to several sinks

use dms::Observation;
use tracing::warn;
use crate::{ObservationSink, SinkError};

/// Forwards every observation to all inner sinks.
///
/// Every sink is attempted even when an earlier one fails; failures are
/// collected into a single [`SinkError::Partial`].
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<(String, Box<dyn ObservationSink + Send>)>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named sink
    pub fn with_sink(mut self, name: impl Into<String>, sink: impl ObservationSink + Send + 'static) -> Self {
        self.push(name, sink);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, sink: impl ObservationSink + Send + 'static) {
        self.sinks.push((name.into(), Box::new(sink)));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn each<F>(&mut self, mut op: F) -> Result<(), SinkError>
    where
        F: FnMut(&mut Box<dyn ObservationSink + Send>) -> Result<(), SinkError>,
    {
        let total = self.sinks.len();
        let mut reasons = Vec::new();

        for (name, sink) in &mut self.sinks {
            if let Err(e) = op(sink) {
                warn!(sink = %name, "Sink failed: {}", e);
                reasons.push(format!("{name}: {e}"));
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(SinkError::Partial {
                failed: reasons.len(),
                total,
                reasons,
            })
        }
    }
}

impl ObservationSink for FanoutSink {
    fn accept(&mut self, observation: &Observation) -> Result<(), SinkError> {
        self.each(|sink| sink.accept(observation))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.each(|sink| sink.flush())
    }
}
