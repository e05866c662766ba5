//! In-memory observation log with bounded retention

use dms::{AlertnessState, Observation, Timestamp};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use crate::{ObservationSink, SinkError};

/// Default retention (~10 minutes at 15 fps)
pub const DEFAULT_MAX_RECORDS: usize = 9000;

/// Bounded observation log, shareable across threads
pub struct ObservationLog {
    records: Mutex<VecDeque<Observation>>,
    max_records: usize,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_RECORDS)
    }

    /// Log keeping at most `max_records`; the oldest are dropped first
    pub fn with_capacity(max_records: usize) -> Self {
        info!("Creating in-memory observation log (max {} records)", max_records);
        Self {
            records: Mutex::new(VecDeque::with_capacity(max_records.min(1024))),
            max_records: max_records.max(1),
        }
    }

    /// Insert an observation
    pub fn insert(&self, observation: Observation) -> Result<(), SinkError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| SinkError::Lock(e.to_string()))?;

        // Enforce retention
        while records.len() >= self.max_records {
            records.pop_front();
        }

        records.push_back(observation);
        Ok(())
    }

    /// Most recent observations, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<Observation>, SinkError> {
        let records = self
            .records
            .lock()
            .map_err(|e| SinkError::Lock(e.to_string()))?;

        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    /// Observations at or after `since`, oldest first
    pub fn since(&self, since: Timestamp) -> Result<Vec<Observation>, SinkError> {
        let records = self
            .records
            .lock()
            .map_err(|e| SinkError::Lock(e.to_string()))?;

        Ok(records.iter().filter(|o| o.timestamp >= since).cloned().collect())
    }

    /// Everything retained, oldest first
    pub fn snapshot(&self) -> Result<Vec<Observation>, SinkError> {
        let records = self
            .records
            .lock()
            .map_err(|e| SinkError::Lock(e.to_string()))?;

        Ok(records.iter().cloned().collect())
    }

    /// Retained observations in the given state
    pub fn count_state(&self, state: AlertnessState) -> usize {
        self.records
            .lock()
            .map(|r| r.iter().filter(|o| o.face_detected && o.state == state).count())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
            debug!("Observation log cleared");
        }
    }
}

impl Default for ObservationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservationSink for ObservationLog {
    fn accept(&mut self, observation: &Observation) -> Result<(), SinkError> {
        self.insert(observation.clone())
    }
}

impl ObservationSink for Arc<ObservationLog> {
    fn accept(&mut self, observation: &Observation) -> Result<(), SinkError> {
        self.insert(observation.clone())
    }
}
