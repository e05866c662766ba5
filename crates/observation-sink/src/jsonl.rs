//! JSON-lines observation log

use dms::Observation;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use crate::{ObservationSink, SinkError};

/// One serialized observation per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn append(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ObservationSink for JsonLinesSink<W> {
    fn accept(&mut self, observation: &Observation) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, observation)
            .map_err(|e| SinkError::Serialization(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Parse a JSON-lines observation log. Blank lines are skipped.
///
/// Unparseable lines yield [`SinkError::Serialization`] and reading goes on.
/// A read error is yielded once as [`SinkError::Io`] and ends the iterator.
pub fn read_observations<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<Observation, SinkError>> {
    let mut failed = false;
    reader
        .lines()
        .map_while(move |line| {
            if failed {
                return None;
            }
            Some(match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(
                    serde_json::from_str(&line)
                        .map_err(|e| SinkError::Serialization(e.to_string())),
                ),
                Err(e) => {
                    failed = true;
                    Some(Err(SinkError::Io(e)))
                }
            })
        })
        .flatten()
}
