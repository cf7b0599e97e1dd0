//! Console Progress Streaming
//!
//! The pipeline reports through a [`ProgressSink`]; the CLI plugs in a
//! [`ProgressTracker`] that keeps the latest state and rebroadcasts every
//! event. A [`ConsoleRenderer`] task subscribes and writes one line per event
//! to stderr, leaving stdout for the report.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use console::{Term, style};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::analysis::{ProgressEvent, ProgressSink};
use crate::types::StepId;

/// Latest known run state
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    pub step: StepId,
    pub percent: u8,
    pub message: String,
    /// Events seen so far
    pub events: usize,
    pub elapsed: Duration,
}

impl ProgressState {
    pub fn is_finished(&self) -> bool {
        self.step.is_terminal()
    }
}

/// Sink that records state and fans events out to subscribers
#[derive(Clone)]
pub struct ProgressTracker {
    state: Arc<RwLock<ProgressState>>,
    sender: broadcast::Sender<ProgressEvent>,
    started: Instant,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            state: Arc::new(RwLock::new(ProgressState::default())),
            sender,
            started: Instant::now(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    pub fn state(&self) -> ProgressState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressTracker {
    fn emit(&self, event: ProgressEvent) {
        {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state.step = event.step;
            state.percent = event.percent();
            state.message = event.message.clone();
            state.events += 1;
            state.elapsed = self.started.elapsed();
        }

        // No subscriber when rendering is disabled
        let _ = self.sender.send(event);
    }
}

/// Writes progress lines to stderr
pub struct ConsoleRenderer {
    term: Term,
    bar_width: usize,
    show_timestamps: bool,
    started: Instant,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            bar_width: 20,
            show_timestamps: true,
            started: Instant::now(),
        }
    }

    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }

    pub fn with_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = show;
        self
    }

    /// One console line for an event
    pub fn render(&self, event: &ProgressEvent) -> String {
        let timestamp = if self.show_timestamps {
            format!(
                "{} ",
                style(format!("[{}]", event.timestamp.format("%H:%M:%S"))).dim()
            )
        } else {
            String::new()
        };

        match event.step {
            StepId::Complete => format!(
                "{}{} {} ({})",
                timestamp,
                style("✓").green(),
                event.message,
                format_duration(self.started.elapsed().as_secs())
            ),
            StepId::Error => format!("{}{} {}", timestamp, style("✗").red(), event.message),
            step => {
                let position = step
                    .stage_number()
                    .map(|n| format!("[{}/{}]", n, StepId::STAGES.len()))
                    .unwrap_or_else(|| "[-/-]".to_string());
                format!(
                    "{}{} {:<20} {} {:>3}%  {}",
                    timestamp,
                    style(position).cyan(),
                    step.title(),
                    render_progress_bar(event.percent() as usize, 100, self.bar_width),
                    event.percent(),
                    event.message
                )
            }
        }
    }

    /// Render events until the tracker is dropped or a terminal event arrives
    pub fn spawn(self, mut receiver: broadcast::Receiver<ProgressEvent>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let _ = self.term.write_line(&self.render(&event));
                        if event.step.is_terminal() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        let _ = self
                            .term
                            .write_line(&format!("  ... {} progress events skipped", skipped));
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a simple progress bar
pub fn render_progress_bar(completed: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return format!("[{}]", " ".repeat(width));
    }

    let progress = (completed as f32 / total as f32).min(1.0);
    let filled = (progress * width as f32) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format duration as human-readable string
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
