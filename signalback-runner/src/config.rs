//! Serializable run configuration.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use signalback_core::domain::OracleConfigSnapshot;
use signalback_core::sim::SizingConfig;

/// Unique identifier for a run (content-addressable hash of the config).
pub type RunId = String;

/// Configuration errors. All fatal, detected before any state is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("start date {start} is after end date {end}")]
    InvertedDates { start: NaiveDate, end: NaiveDate },

    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),
}

/// Weekday anchor for weekly analysis, spelled the way the config file
/// spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl AnchorDay {
    pub fn to_weekday(self) -> Weekday {
        match self {
            AnchorDay::Monday => Weekday::Mon,
            AnchorDay::Tuesday => Weekday::Tue,
            AnchorDay::Wednesday => Weekday::Wed,
            AnchorDay::Thursday => Weekday::Thu,
            AnchorDay::Friday => Weekday::Fri,
        }
    }
}

/// How often analysis dates are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cadence", rename_all = "lowercase")]
pub enum AnalysisFrequency {
    /// One analysis per week, on the anchor weekday.
    Weekly { anchor: AnchorDay },
    /// One analysis per calendar day.
    Daily,
}

impl Default for AnalysisFrequency {
    fn default() -> Self {
        AnalysisFrequency::Weekly {
            anchor: AnchorDay::Monday,
        }
    }
}

/// Transaction-cost knobs. Disabled by default and not applied by the
/// simulator; carried in the config (and fingerprint) so enabling them
/// later invalidates cached results instead of silently reusing them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub include_transaction_costs: bool,
    pub commission_per_trade: f64,
    pub include_slippage: bool,
    pub slippage_bps: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            include_transaction_costs: false,
            commission_per_trade: 0.0,
            include_slippage: false,
            slippage_bps: 0.0,
        }
    }
}

/// Everything needed to reproduce a run: period, ticker, sizing, and the
/// oracle configuration snapshot stored with each signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    #[serde(default)]
    pub frequency: AnalysisFrequency,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub costs: CostConfig,
    #[serde(default)]
    pub oracle: OracleConfigSnapshot,
}

fn default_initial_capital() -> f64 {
    100_000.0
}

impl RunConfig {
    pub fn new(ticker: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            start_date,
            end_date,
            initial_capital: default_initial_capital(),
            frequency: AnalysisFrequency::default(),
            sizing: SizingConfig::default(),
            costs: CostConfig::default(),
            oracle: OracleConfigSnapshot::default(),
        }
    }

    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::InvertedDates {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        Ok(())
    }

    /// Scheduled analysis dates for this config's period and frequency.
    pub fn scheduled_dates(&self) -> Vec<NaiveDate> {
        match self.frequency {
            AnalysisFrequency::Weekly { anchor } => signalback_core::schedule::weekly_dates(
                self.start_date,
                self.end_date,
                anchor.to_weekday(),
            ),
            AnalysisFrequency::Daily => {
                signalback_core::schedule::daily_dates(self.start_date, self.end_date)
            }
        }
    }

    /// Deterministic hash ID for this configuration. Two identical
    /// configs share a RunId, so their artifacts are interchangeable.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        hash.to_hex().to_string()
    }
}
