//! Resumable signal-generation workflow.
//!
//! Walks the scheduled calendar of analysis dates, invokes the oracle at
//! most once per resolved trading day, and persists each signal plus the
//! resume cursor before moving on. The loop can be paused at the
//! cooperative checkpoint after every processed date; because signal and
//! cursor are both durable before the checkpoint, re-running the
//! identical command resumes from where it stopped.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use signalback_core::data::MarketDataProvider;
use signalback_core::domain::Signal;
use signalback_core::interpret::interpret;
use signalback_core::oracle::Oracle;
use signalback_core::schedule::TradingCalendar;

use crate::config::RunConfig;
use crate::store::{SignalStore, StoreError};

/// Workflow errors. Oracle failures are not here: they skip the date and
/// leave it retryable instead of failing the run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A durable write failed. Proceeding would break the resume
    /// guarantee, so the run aborts.
    #[error("persistence failure: {0}")]
    Store(#[from] StoreError),
}

/// Lifecycle of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    NotStarted,
    InProgress,
    /// Operator-requested stop with all progress durable.
    Paused,
    Completed,
}

/// What happened to one scheduled date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOutcome {
    /// Oracle invoked, signal and cursor persisted.
    Generated { resolved: NaiveDate },
    /// A signal for this date already exists; the oracle was not called.
    AlreadyProcessed,
    /// Oracle invocation failed; nothing persisted, date retryable.
    OracleFailed { reason: String },
}

/// Checkpoint payload handed to the controller after each processed date.
#[derive(Debug, Clone)]
pub struct CheckpointInfo {
    pub scheduled_date: NaiveDate,
    pub index: usize,
    pub total: usize,
    pub outcome: DateOutcome,
}

/// Controller verdict at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop,
}

/// Polled between iterations; this is the only suspension point, so a
/// stop never interrupts an in-flight oracle call.
pub trait CheckpointHandler {
    fn on_checkpoint(&mut self, info: &CheckpointInfo) -> Control;
}

/// Handler that never stops. Used for unattended runs.
pub struct AutoContinue;

impl CheckpointHandler for AutoContinue {
    fn on_checkpoint(&mut self, _info: &CheckpointInfo) -> Control {
        Control::Continue
    }
}

/// Summary of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    pub state: RunState,
    pub total_scheduled: usize,
    pub generated: usize,
    pub already_processed: usize,
    pub failed: usize,
}

/// The resumable signal-generation loop.
pub struct SignalGenerationWorkflow<'a> {
    config: &'a RunConfig,
    oracle: &'a dyn Oracle,
    provider: &'a dyn MarketDataProvider,
    store: &'a mut SignalStore,
}

impl<'a> SignalGenerationWorkflow<'a> {
    pub fn new(
        config: &'a RunConfig,
        oracle: &'a dyn Oracle,
        provider: &'a dyn MarketDataProvider,
        store: &'a mut SignalStore,
    ) -> Self {
        Self {
            config,
            oracle,
            provider,
            store,
        }
    }

    /// Run until the schedule is exhausted or the handler asks to stop.
    pub fn run(
        &mut self,
        handler: &mut dyn CheckpointHandler,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let scheduled = self.config.scheduled_dates();
        let calendar = TradingCalendar::new(self.provider, self.config.ticker.clone());

        // Resume at the first scheduled date strictly after the cursor;
        // dates at or before it are never revisited.
        let start_index = match self.store.progress().last_processed_date {
            Some(cursor) => {
                info!(cursor = %cursor, "resuming from persisted progress");
                scheduled.partition_point(|d| *d <= cursor)
            }
            None => 0,
        };

        let mut outcome = WorkflowOutcome {
            state: if start_index >= scheduled.len() {
                RunState::Completed
            } else {
                RunState::InProgress
            },
            total_scheduled: scheduled.len(),
            generated: 0,
            already_processed: 0,
            failed: 0,
        };

        info!(
            total = scheduled.len(),
            start_index,
            ticker = %self.config.ticker,
            "starting signal generation"
        );

        for (index, &scheduled_date) in scheduled.iter().enumerate().skip(start_index) {
            let date_outcome = self.process_date(scheduled_date, &calendar)?;

            match &date_outcome {
                DateOutcome::Generated { .. } => outcome.generated += 1,
                DateOutcome::AlreadyProcessed => {
                    // Tolerated out-of-order partial state; no oracle call
                    // happened, so no checkpoint either.
                    outcome.already_processed += 1;
                    continue;
                }
                DateOutcome::OracleFailed { .. } => outcome.failed += 1,
            }

            let info = CheckpointInfo {
                scheduled_date,
                index,
                total: scheduled.len(),
                outcome: date_outcome,
            };
            if handler.on_checkpoint(&info) == Control::Stop {
                info!(
                    processed = index + 1,
                    total = scheduled.len(),
                    "stop requested, pausing with progress saved"
                );
                outcome.state = RunState::Paused;
                return Ok(outcome);
            }
        }

        outcome.state = RunState::Completed;
        info!(
            generated = outcome.generated,
            skipped = outcome.already_processed,
            failed = outcome.failed,
            total_signals = self.store.signal_count(),
            "signal generation completed"
        );
        Ok(outcome)
    }

    /// Process one scheduled date: the explicit per-date skip/retry
    /// branch. Persistence failures bubble up; oracle failures do not.
    fn process_date(
        &mut self,
        scheduled_date: NaiveDate,
        calendar: &TradingCalendar<'_>,
    ) -> Result<DateOutcome, WorkflowError> {
        if self.store.contains(scheduled_date) {
            return Ok(DateOutcome::AlreadyProcessed);
        }

        let resolved = calendar.next_trading_day(scheduled_date);
        if resolved != scheduled_date {
            info!(scheduled = %scheduled_date, resolved = %resolved, "shifted to next trading day");
            // The store is keyed by resolved date, so a crash between the
            // signal write and the cursor write must be caught here too.
            if self.store.contains(resolved) {
                return Ok(DateOutcome::AlreadyProcessed);
            }
        }

        let text = match self.oracle.analyze(&self.config.ticker, resolved) {
            Ok(text) => text,
            Err(e) => {
                warn!(date = %resolved, error = %e, "oracle invocation failed, date stays retryable");
                return Ok(DateOutcome::OracleFailed {
                    reason: e.to_string(),
                });
            }
        };

        let decision = interpret(&text);
        let signal = Signal {
            date: resolved,
            ticker: self.config.ticker.clone(),
            decision_text: text,
            decision,
            analysis_timestamp: Utc::now(),
            config: self.oracle.config_snapshot(),
        };

        // Signal first, then cursor: both durable before the next date.
        // A crash in between leaves a signal the existence check above
        // will find on resume.
        if let Err(e) = self.store.insert(signal) {
            error!(date = %resolved, error = %e, "failed to persist signal, aborting");
            return Err(e.into());
        }
        if let Err(e) = self.store.advance(resolved) {
            error!(date = %resolved, error = %e, "failed to persist progress, aborting");
            return Err(e.into());
        }

        info!(date = %resolved, action = ?decision.action(), "signal persisted");
        Ok(DateOutcome::Generated { resolved })
    }
}
