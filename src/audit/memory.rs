//! In-memory audit sink for tests and embedding

use std::sync::Mutex;

use serde_json::Value;

use super::{AuditEvent, AuditEventKind, AuditSink};

#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events in append order
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Event kinds in append order
    pub fn kinds(&self) -> Vec<AuditEventKind> {
        self.events().iter().map(|e| e.event_type).collect()
    }

    pub fn count(&self, kind: AuditEventKind) -> usize {
        self.events().iter().filter(|e| e.event_type == kind).count()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, kind: AuditEventKind, payload: Value) {
        match self.events.lock() {
            Ok(mut events) => events.push(AuditEvent::new(kind, payload)),
            Err(e) => log::error!("Failed to record {} audit event: {}", kind, e),
        }
    }
}
