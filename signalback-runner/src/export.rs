//! Result export — JSON artifact plus CSV files for external analysis.
//!
//! All persisted artifacts carry a `schema_version` field; artifacts with
//! a newer version than this build supports are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use signalback_core::domain::{
    BacktestResults, PortfolioSnapshot, Transaction, RESULTS_SCHEMA_VERSION,
};

const RESULTS_FILE: &str = "backtest_results.json";
const TRANSACTIONS_FILE: &str = "transactions.csv";
const HISTORY_FILE: &str = "portfolio_history.csv";

/// Serialize results to pretty JSON.
pub fn export_json(results: &BacktestResults) -> Result<String> {
    serde_json::to_string_pretty(results).context("failed to serialize BacktestResults to JSON")
}

/// Deserialize results from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResults> {
    let results: BacktestResults =
        serde_json::from_str(json).context("failed to deserialize BacktestResults from JSON")?;
    if results.schema_version > RESULTS_SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            results.schema_version,
            RESULTS_SCHEMA_VERSION
        );
    }
    Ok(results)
}

/// Export the transaction log as CSV.
///
/// Columns: date, action, shares, price, amount, confidence
pub fn export_transactions_csv(transactions: &[Transaction]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "action", "shares", "price", "amount", "confidence"])?;
    for t in transactions {
        wtr.write_record([
            &t.date.to_string(),
            &t.action.to_string(),
            &format!("{:.6}", t.shares),
            &format!("{:.2}", t.price),
            &format!("{:.2}", t.amount),
            &format!("{:.2}", t.confidence),
        ])?;
    }
    let bytes = wtr.into_inner().context("CSV writer flush failed")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Export the snapshot trajectory as CSV.
///
/// Columns: date, agent_value, benchmark_value, price, cash, shares
pub fn export_history_csv(history: &[PortfolioSnapshot]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "agent_value",
        "benchmark_value",
        "price",
        "cash",
        "shares",
    ])?;
    for s in history {
        wtr.write_record([
            &s.date.to_string(),
            &format!("{:.2}", s.agent_value),
            &format!("{:.2}", s.benchmark_value),
            &format!("{:.2}", s.price),
            &format!("{:.2}", s.cash),
            &format!("{:.6}", s.shares),
        ])?;
    }
    let bytes = wtr.into_inner().context("CSV writer flush failed")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Write the JSON artifact and both CSVs under `output_dir`. Returns the
/// paths written.
pub fn save_artifacts(results: &BacktestResults, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut written = Vec::new();

    let json_path = output_dir.join(RESULTS_FILE);
    std::fs::write(&json_path, export_json(results)?)
        .with_context(|| format!("failed to write {}", json_path.display()))?;
    written.push(json_path);

    let tx_path = output_dir.join(TRANSACTIONS_FILE);
    std::fs::write(&tx_path, export_transactions_csv(&results.transactions)?)
        .with_context(|| format!("failed to write {}", tx_path.display()))?;
    written.push(tx_path);

    let history_path = output_dir.join(HISTORY_FILE);
    std::fs::write(&history_path, export_history_csv(&results.portfolio_history)?)
        .with_context(|| format!("failed to write {}", history_path.display()))?;
    written.push(history_path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use signalback_core::domain::{
        Action, FinalPortfolio, FinalValues, Outperformance, Period, Returns,
    };

    fn sample_results() -> BacktestResults {
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        BacktestResults {
            schema_version: RESULTS_SCHEMA_VERSION,
            run_id: "abc".into(),
            period: Period {
                start: date,
                end: date,
                days: 1,
            },
            initial_capital: 100_000.0,
            final_values: FinalValues {
                agent: 100_500.0,
                benchmark: 101_000.0,
            },
            returns: Returns {
                agent: 0.005,
                benchmark: 0.01,
            },
            outperformance: Outperformance {
                absolute: -500.0,
                relative: -500.0 / 101_000.0,
            },
            transactions: vec![Transaction {
                date,
                action: Action::Buy,
                shares: 51.6129,
                price: 310.0,
                amount: 16_000.0,
                confidence: 0.8,
            }],
            portfolio_history: vec![PortfolioSnapshot {
                date,
                agent_value: 100_000.0,
                benchmark_value: 100_000.0,
                price: 310.0,
                cash: 84_000.0,
                shares: 51.6129,
            }],
            final_portfolio: FinalPortfolio {
                cash: 84_000.0,
                shares: 51.6129,
                total_value: 100_500.0,
            },
        }
    }

    #[test]
    fn json_round_trip() {
        let results = sample_results();
        let json = export_json(&results).unwrap();
        let back = import_json(&json).unwrap();
        assert_eq!(back, results);
    }

    #[test]
    fn newer_schema_version_rejected() {
        let mut results = sample_results();
        results.schema_version = RESULTS_SCHEMA_VERSION + 1;
        let json = export_json(&results).unwrap();
        assert!(import_json(&json).is_err());
    }

    #[test]
    fn transactions_csv_shape() {
        let csv = export_transactions_csv(&sample_results().transactions).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,action,shares,price,amount,confidence"
        );
        assert!(lines.next().unwrap().starts_with("2024-05-07,buy,51.612900"));
    }

    #[test]
    fn artifacts_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let written = save_artifacts(&sample_results(), dir.path()).unwrap();
        assert_eq!(written.len(), 3);
        for path in written {
            assert!(path.exists());
        }
    }
}
