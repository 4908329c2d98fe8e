//! Aggregate backtest results — the final comparison artifact.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::portfolio::Transaction;

/// Current schema version for persisted result artifacts.
pub const RESULTS_SCHEMA_VERSION: u32 = 1;

/// One row of the simulated trajectory, recorded per signal date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub agent_value: f64,
    pub benchmark_value: f64,
    pub price: f64,
    pub cash: f64,
    pub shares: f64,
}

/// Simulated period bounds. `end` is the date actually used for
/// finalization, which may be earlier than the configured end date when
/// the price series runs out first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalValues {
    pub agent: f64,
    pub benchmark: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Returns {
    pub agent: f64,
    pub benchmark: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outperformance {
    pub absolute: f64,
    pub relative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalPortfolio {
    pub cash: f64,
    pub shares: f64,
    pub total_value: f64,
}

/// Full output of a simulation run: agent-vs-benchmark comparison plus
/// the complete trade and trajectory history needed to reproduce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResults {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Fingerprint of the run configuration that produced these results.
    #[serde(default)]
    pub run_id: String,
    pub period: Period,
    pub initial_capital: f64,
    pub final_values: FinalValues,
    pub returns: Returns,
    pub outperformance: Outperformance,
    pub transactions: Vec<Transaction>,
    pub portfolio_history: Vec<PortfolioSnapshot>,
    pub final_portfolio: FinalPortfolio,
}

fn default_schema_version() -> u32 {
    RESULTS_SCHEMA_VERSION
}
