//! Progress Reporting
//!
//! The pipeline reports each step transition through a [`ProgressSink`] as it
//! happens. Sinks are plain observers: the pipeline never reads back from them
//! and a sink with no listener silently drops events.
//!
//! Provided sinks:
//! - any `Fn(ProgressEvent)` closure
//! - `tokio::sync::mpsc::UnboundedSender` and `tokio::sync::broadcast::Sender`
//! - [`ProgressLog`] for collecting an ordered log in memory
//! - [`NullProgress`] to discard everything

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use tokio::sync::{broadcast, mpsc};

use crate::types::StepId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub step: StepId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(step: StepId, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn percent(&self) -> u8 {
        self.step.progress_percent()
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

impl ProgressSink for mpsc::UnboundedSender<ProgressEvent> {
    fn emit(&self, event: ProgressEvent) {
        // Receiver dropped means nobody is watching anymore
        let _ = self.send(event);
    }
}

impl ProgressSink for broadcast::Sender<ProgressEvent> {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

/// In-memory, append-only event log
#[derive(Debug, Default)]
pub struct ProgressLog {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn steps(&self) -> Vec<StepId> {
        self.events().iter().map(|e| e.step).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressSink for ProgressLog {
    fn emit(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
