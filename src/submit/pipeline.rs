use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::form::{FormSubmitter, SubmitError};
use crate::events::{EventSink, Level, Phase, ProgressEvent};
use crate::records::CompositeRecord;

/// Pause after every submission so the form endpoint is not hammered.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub success: usize,
    pub failure: usize,
    pub total: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &Result<(), SubmitError>) {
        match outcome {
            Ok(()) => self.success += 1,
            Err(_) => self.failure += 1,
        }
    }

    pub fn attempted(&self) -> usize {
        self.success + self.failure
    }
}

/// Where the run is; travels on every progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Running,
    Submitting { index: usize },
    Succeeded { index: usize },
    Failed { index: usize },
    Done,
}

pub struct PipelineOptions {
    /// Global industry; empty means "use the form's own selection".
    pub industry: String,
    pub pacing: Duration,
}

/// Submits records one at a time, in order. A failed item never stops the run.
pub struct Pipeline<S, E> {
    submitter: S,
    sink: E,
    options: PipelineOptions,
    state: PipelineState,
}

impl<S: FormSubmitter, E: EventSink> Pipeline<S, E> {
    pub fn new(submitter: S, sink: E, options: PipelineOptions) -> Self {
        Self {
            submitter,
            sink,
            options,
            state: PipelineState::Idle,
        }
    }

    pub async fn run(&mut self, records: &[CompositeRecord]) -> RunSummary {
        self.state = PipelineState::Running;
        let total = records.len();
        let mut summary = RunSummary {
            total,
            ..Default::default()
        };
        info!("Submitting {} records", total);
        self.emit(
            Phase::Started,
            Level::Info,
            format!("Starting {} submissions", total),
            summary,
        );

        for (index, record) in records.iter().enumerate() {
            self.state = PipelineState::Submitting { index };
            self.emit(
                Phase::ItemProgress,
                Level::Info,
                format!("Processing ({}/{}): {}", index + 1, total, record.email),
                summary,
            );

            let outcome = self
                .submitter
                .submit(record, &self.options.industry)
                .await;
            summary.record(&outcome);

            match outcome {
                Ok(()) => {
                    self.state = PipelineState::Succeeded { index };
                    self.emit(
                        Phase::ItemSuccess,
                        Level::Success,
                        format!("Success: {}", record.email),
                        summary,
                    );
                }
                Err(e) => {
                    self.state = PipelineState::Failed { index };
                    warn!("Submission {} for {} failed: {}", index + 1, record.company, e);
                    self.emit(
                        Phase::ItemFailure,
                        Level::Error,
                        format!("Failed: {} - {}", record.email, e),
                        summary,
                    );
                }
            }

            tokio::time::sleep(self.options.pacing).await;
        }

        self.state = PipelineState::Done;
        info!(
            "Submitted {} records ({} ok, {} failed)",
            total, summary.success, summary.failure
        );
        self.emit(
            Phase::Done,
            Level::Info,
            format!(
                "Complete. Success: {}, Failed: {}",
                summary.success, summary.failure
            ),
            summary,
        );
        summary
    }

    fn emit(&self, phase: Phase, level: Level, text: String, counts: RunSummary) {
        self.sink
            .emit(ProgressEvent::new(phase, level, self.state, text, counts));
    }
}
