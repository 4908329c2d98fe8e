//! Signalback Runner — resumable signal generation and simulation orchestration.
//!
//! This crate builds on `signalback-core` to provide:
//! - Durable persistence of signals and the resume cursor
//! - The checkpointed signal-generation workflow (pause/resume safe)
//! - Run configuration with a deterministic fingerprint
//! - Simulation orchestration over persisted signals
//! - Result export (JSON artifact, CSV logs) and a text report

pub mod config;
pub mod export;
pub mod report;
pub mod simulate;
pub mod store;
pub mod workflow;

pub use config::{AnalysisFrequency, AnchorDay, ConfigError, CostConfig, RunConfig, RunId};
pub use export::{export_json, import_json, save_artifacts};
pub use report::render_summary;
pub use simulate::{run_simulation, SimulateError};
pub use store::{Progress, SignalStore, StoreError};
pub use workflow::{
    AutoContinue, CheckpointHandler, CheckpointInfo, Control, DateOutcome, RunState,
    SignalGenerationWorkflow, WorkflowError, WorkflowOutcome,
};
