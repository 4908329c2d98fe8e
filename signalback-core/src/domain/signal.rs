//! Persisted per-date analysis records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::decision::Decision;

/// Snapshot of the oracle configuration in force when a signal was
/// produced. Persisted with every signal so old runs stay interpretable
/// after the configuration changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfigSnapshot {
    pub provider: String,
    pub deep_model: String,
    pub quick_model: String,
    pub debate_rounds: u32,
}

impl Default for OracleConfigSnapshot {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            deep_model: "o4-mini".to_string(),
            quick_model: "gpt-4.1-mini".to_string(),
            debate_rounds: 1,
        }
    }
}

/// One oracle invocation's resolved date, raw text, and interpreted
/// decision. Created exactly once per resolved trading day and immutable
/// thereafter; keyed by `date` in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Resolved trading day the recommendation applies to.
    pub date: NaiveDate,
    pub ticker: String,
    /// Raw recommendation text as returned by the oracle.
    pub decision_text: String,
    /// Interpreted form, flattened into `action` + optional `confidence`.
    #[serde(flatten)]
    pub decision: Decision,
    /// Wall-clock time the analysis ran (not the market date).
    pub analysis_timestamp: DateTime<Utc>,
    pub config: OracleConfigSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_round_trips_through_json() {
        let signal = Signal {
            date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            ticker: "QQQ".to_string(),
            decision_text: "Strong Buy signal, high confidence".to_string(),
            decision: Decision::Buy { confidence: 0.8 },
            analysis_timestamp: Utc::now(),
            config: OracleConfigSnapshot::default(),
        };
        let json = serde_json::to_string(&signal).unwrap();
        let back: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, signal);
    }

    #[test]
    fn decision_flattens_into_signal_object() {
        let signal = Signal {
            date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            ticker: "QQQ".to_string(),
            decision_text: "Hold".to_string(),
            decision: Decision::Hold,
            analysis_timestamp: Utc::now(),
            config: OracleConfigSnapshot::default(),
        };
        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(value["action"], "hold");
        assert!(value.get("decision").is_none());
    }
}
