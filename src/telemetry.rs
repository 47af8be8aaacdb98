// src/telemetry.rs
//
// Observation log side channel.
// - ObservationSink: trait used by the step orchestrator
// - NoopSink:        discards all rows
// - CsvSink:         appends one delimited row per decoded observation
//
// The log is not required for correctness: a failed write is reported on
// stderr and never aborts the control step.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::types::Observation;

/// Abstract sink for per-step observation rows.
pub trait ObservationSink {
    /// Record one decoded observation. `step` is the episode step index at
    /// which it was received.
    fn record(&mut self, step: u64, obs: &Observation);
}

/// Sink that discards all rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ObservationSink for NoopSink {
    fn record(&mut self, _step: u64, _obs: &Observation) {
        // intentionally no-op
    }
}

/// Append-only CSV sink.
///
/// One row per observation: `step,tag,yaw,pitch,zoom,mi`. Rows are flushed
/// as they are written so the log survives an aborted run.
pub struct CsvSink {
    writer: BufWriter<File>,
    path: String,
}

impl CsvSink {
    /// Open `path` for appending, creating it if missing.
    pub fn append(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.display().to_string(),
        })
    }
}

impl ObservationSink for CsvSink {
    fn record(&mut self, step: u64, obs: &Observation) {
        let row = writeln!(
            self.writer,
            "{},{},{},{},{},{}",
            step, obs.tag, obs.yaw, obs.pitch, obs.zoom, obs.mi
        )
        .and_then(|_| self.writer.flush());
        if let Err(e) = row {
            eprintln!("CsvSink: failed to append row to '{}': {}", self.path, e);
        }
    }
}
