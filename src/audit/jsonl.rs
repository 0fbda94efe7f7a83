//! JSON Lines audit sink

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use super::{AuditEvent, AuditEventKind, AuditSink};
use crate::error::{AgentError, Result};

/// Appends one JSON object per line to a file
pub struct JsonlAuditSink {
    path: PathBuf,
    /// Serializes appends so concurrent runs never interleave partial lines
    write_lock: Mutex<()>,
}

impl JsonlAuditSink {
    /// Create a sink at `path`, creating parent directories
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single event; the line is built fully before the write
    pub fn append(&self, event: &AuditEvent) -> Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| AgentError::Audit(e.to_string()))?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, kind: AuditEventKind, payload: Value) {
        let event = AuditEvent::new(kind, payload);
        if let Err(e) = self.append(&event) {
            log::error!("Failed to persist {} audit event to {}: {}", kind, self.path.display(), e);
        }
    }
}

/// Read every event from an audit log
///
/// Lines that do not parse are skipped with a warning.
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<AuditEvent>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AuditEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => log::warn!("Skipping audit line {} in {}: {}", index + 1, path.display(), e),
        }
    }
    Ok(events)
}
