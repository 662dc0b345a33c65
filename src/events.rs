use std::io::Write;

use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::submit::pipeline::{PipelineState, RunSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Started,
    ItemProgress,
    ItemSuccess,
    ItemFailure,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub level: Level,
    pub state: PipelineState,
    pub text: String,
    pub counts: RunSummary,
    /// Set only on the final `Done` event.
    pub completed: bool,
    pub at: DateTime<Local>,
}

impl ProgressEvent {
    pub fn new(
        phase: Phase,
        level: Level,
        state: PipelineState,
        text: String,
        counts: RunSummary,
    ) -> Self {
        Self {
            phase,
            level,
            state,
            text,
            counts,
            completed: phase == Phase::Done,
            at: Local::now(),
        }
    }

    /// `12:04:59 [error] Failed: ...`
    pub fn log_line(&self) -> String {
        let level = match self.level {
            Level::Info => "info",
            Level::Success => "ok",
            Level::Error => "error",
        };
        format!("{} [{}] {}", self.at.format("%H:%M:%S"), level, self.text)
    }
}

/// Receives progress notifications. Delivery is best effort.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

pub struct ChannelSink {
    tx: UnboundedSender<ProgressEvent>,
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        // Listener may be gone; the pipeline does not care.
        let _ = self.tx.send(event);
    }
}

pub fn channel() -> (ChannelSink, UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink { tx }, rx)
}

/// Render events until the sender side closes. Returns the counts of the `Done` event.
pub async fn render(
    mut rx: UnboundedReceiver<ProgressEvent>,
    total: usize,
    json: bool,
) -> Option<RunSummary> {
    let pb = if json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} (eta {eta})")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb
    };

    let last = drain_to(&mut rx, &pb, json, &mut std::io::stdout()).await;
    pb.finish_and_clear();
    last
}

// A hidden bar (json mode, or stderr not a terminal) swallows `println`,
// so lines go straight to `out` instead.
async fn drain_to(
    rx: &mut UnboundedReceiver<ProgressEvent>,
    pb: &ProgressBar,
    json: bool,
    out: &mut impl Write,
) -> Option<RunSummary> {
    let mut last = None;
    while let Some(event) = rx.recv().await {
        let line = if json {
            match serde_json::to_string(&event) {
                Ok(line) => Some(line),
                Err(e) => {
                    tracing::warn!("Could not serialize event: {}", e);
                    None
                }
            }
        } else {
            Some(event.log_line())
        };

        if let Some(line) = line {
            if json || pb.is_hidden() {
                if let Err(e) = writeln!(out, "{}", line) {
                    tracing::warn!("Could not write progress line: {}", e);
                }
            } else {
                pb.println(line);
            }
        }

        match event.phase {
            Phase::ItemSuccess | Phase::ItemFailure => pb.inc(1),
            Phase::Done => last = Some(event.counts),
            Phase::Started | Phase::ItemProgress => {}
        }
    }
    last
}
