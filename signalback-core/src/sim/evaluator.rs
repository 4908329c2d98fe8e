//! Performance evaluation against a fixed-share buy-and-hold benchmark.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::data::PriceSeries;
use crate::domain::{
    BacktestResults, FinalPortfolio, FinalValues, Outperformance, Period, PortfolioSnapshot,
    Returns, Signal, RESULTS_SCHEMA_VERSION,
};
use crate::sim::simulator::{PortfolioSimulator, SizingConfig};

/// Fatal simulation errors: the period cannot be priced at all.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("no price data on or after {date} to open the benchmark position")]
    NoBenchmarkPrice { date: NaiveDate },

    #[error("no price data on or after {date} for a signal")]
    NoSignalPrice { date: NaiveDate },

    #[error("price series is empty, cannot finalize the period")]
    EmptySeries,
}

/// Evaluation parameters.
#[derive(Debug, Clone, Copy)]
pub struct EvalConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub sizing: SizingConfig,
}

/// Replay persisted signals chronologically against the price series and
/// compare the resulting trajectory with buy-and-hold.
///
/// Pure with respect to its inputs: identical signals and prices produce
/// bit-identical results, so re-evaluation with different sizing never
/// requires touching the oracle. Signals are sorted here; persistence
/// order is not assumed to be chronological.
pub fn evaluate(
    signals: &[Signal],
    series: &PriceSeries,
    config: &EvalConfig,
) -> Result<BacktestResults, SimError> {
    let mut ordered: Vec<&Signal> = signals.iter().collect();
    ordered.sort_by_key(|s| s.date);

    // Benchmark share count is fixed once at period start and never
    // rebalanced afterwards.
    let benchmark_open = series
        .on_or_after(config.start_date)
        .ok_or(SimError::NoBenchmarkPrice {
            date: config.start_date,
        })?;
    let benchmark_shares = config.initial_capital / benchmark_open.close;

    info!(
        signals = ordered.len(),
        initial_capital = config.initial_capital,
        benchmark_shares,
        benchmark_open = benchmark_open.close,
        "starting simulation"
    );

    let mut simulator = PortfolioSimulator::new(config.initial_capital, config.sizing);
    let mut history = Vec::with_capacity(ordered.len());

    for signal in &ordered {
        let close = series
            .on_or_after(signal.date)
            .ok_or(SimError::NoSignalPrice { date: signal.date })?;

        if let Some(tx) = simulator.apply(signal.decision, close.close, signal.date) {
            debug!(
                date = %tx.date,
                action = tx.action.as_str(),
                shares = tx.shares,
                price = tx.price,
                "executed trade"
            );
        }

        history.push(PortfolioSnapshot {
            date: signal.date,
            agent_value: simulator.value_at(close.close),
            benchmark_value: benchmark_shares * close.close,
            price: close.close,
            cash: simulator.portfolio().cash,
            shares: simulator.portfolio().shares,
        });
    }

    // Finalize at the configured end date, or at the last date the series
    // covers when the end date itself has no data.
    let final_close = match series.exact(config.end_date) {
        Some(close) => close,
        None => series.last().ok_or(SimError::EmptySeries)?,
    };

    let final_agent = simulator.value_at(final_close.close);
    let final_benchmark = benchmark_shares * final_close.close;
    let absolute = final_agent - final_benchmark;

    let portfolio = simulator.portfolio();
    Ok(BacktestResults {
        schema_version: RESULTS_SCHEMA_VERSION,
        run_id: String::new(),
        period: Period {
            start: config.start_date,
            end: final_close.date,
            days: history.len(),
        },
        initial_capital: config.initial_capital,
        final_values: FinalValues {
            agent: final_agent,
            benchmark: final_benchmark,
        },
        returns: Returns {
            agent: (final_agent - config.initial_capital) / config.initial_capital,
            benchmark: (final_benchmark - config.initial_capital) / config.initial_capital,
        },
        outperformance: Outperformance {
            absolute,
            relative: absolute / final_benchmark,
        },
        transactions: portfolio.transactions.clone(),
        portfolio_history: history,
        final_portfolio: FinalPortfolio {
            cash: portfolio.cash,
            shares: portfolio.shares,
            total_value: final_agent,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DailyClose;
    use crate::domain::{Decision, OracleConfigSnapshot};
    use chrono::Utc;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn signal(d: u32, text: &str, decision: Decision) -> Signal {
        Signal {
            date: date(d),
            ticker: "QQQ".to_string(),
            decision_text: text.to_string(),
            decision,
            analysis_timestamp: Utc::now(),
            config: OracleConfigSnapshot::default(),
        }
    }

    fn series(closes: &[(u32, f64)]) -> PriceSeries {
        PriceSeries::new(
            "QQQ",
            closes
                .iter()
                .map(|(d, close)| DailyClose {
                    date: date(*d),
                    close: *close,
                })
                .collect(),
        )
    }

    fn config(start: u32, end: u32) -> EvalConfig {
        EvalConfig {
            start_date: date(start),
            end_date: date(end),
            initial_capital: 100_000.0,
            sizing: SizingConfig::default(),
        }
    }

    #[test]
    fn benchmark_shares_fixed_at_first_price_on_or_after_start() {
        let series = series(&[(6, 300.0), (7, 310.0), (10, 320.0)]);
        let signals = vec![signal(7, "hold", Decision::Hold)];
        // Start date 5th has no data; benchmark opens at the 6th's 300.
        let results = evaluate(&signals, &series, &config(5, 10)).unwrap();
        let snapshot = &results.portfolio_history[0];
        let benchmark_shares = 100_000.0 / 300.0;
        assert!((snapshot.benchmark_value - benchmark_shares * 310.0).abs() < 1e-6);
        assert!((results.final_values.benchmark - benchmark_shares * 320.0).abs() < 1e-6);
    }

    #[test]
    fn reference_scenario() {
        // Worked example: open at 300, strong buy at 310, hold, close 320.
        let series = series(&[(6, 300.0), (7, 310.0), (10, 320.0)]);
        let signals = vec![
            signal(7, "Strong Buy signal, high confidence", Decision::Buy { confidence: 0.8 }),
            signal(10, "Hold, no clear signal", Decision::Hold),
        ];
        let results = evaluate(&signals, &series, &config(6, 10)).unwrap();

        assert_eq!(results.transactions.len(), 1);
        let tx = &results.transactions[0];
        assert!((tx.amount - 16_000.0).abs() < 1e-9);
        assert!((tx.shares - 51.6129).abs() < 1e-4);

        assert!((results.final_portfolio.cash - 84_000.0).abs() < 1e-9);
        assert!((results.final_values.agent - 100_516.13).abs() < 0.01);
        assert!((results.final_values.benchmark - 106_666.67).abs() < 0.01);
        assert!((results.outperformance.absolute - (-6_150.54)).abs() < 0.01);
        assert!(results.outperformance.relative < 0.0);
    }

    #[test]
    fn signals_are_sorted_before_replay() {
        let series = series(&[(6, 300.0), (7, 310.0), (10, 320.0)]);
        // Later sell listed first; replay must still buy on the 7th before
        // selling on the 10th.
        let signals = vec![
            signal(10, "sell", Decision::Sell { confidence: 0.8 }),
            signal(7, "buy", Decision::Buy { confidence: 0.8 }),
        ];
        let results = evaluate(&signals, &series, &config(6, 10)).unwrap();
        assert_eq!(results.transactions.len(), 2);
        assert_eq!(results.transactions[0].date, date(7));
        assert_eq!(results.transactions[1].date, date(10));
    }

    #[test]
    fn end_date_without_data_falls_back_to_last_close() {
        let series = series(&[(6, 300.0), (7, 310.0)]);
        let signals = vec![signal(7, "hold", Decision::Hold)];
        let results = evaluate(&signals, &series, &config(6, 31)).unwrap();
        assert_eq!(results.period.end, date(7));
        assert!((results.final_values.benchmark - 100_000.0 / 300.0 * 310.0).abs() < 1e-6);
    }

    #[test]
    fn signal_past_series_end_is_fatal() {
        let series = series(&[(6, 300.0)]);
        let signals = vec![signal(20, "hold", Decision::Hold)];
        match evaluate(&signals, &series, &config(6, 20)) {
            Err(SimError::NoSignalPrice { date: d }) => assert_eq!(d, date(20)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn evaluation_is_deterministic() {
        let series = series(&[(6, 300.0), (7, 310.0), (10, 320.0)]);
        let signals = vec![
            signal(7, "strong buy", Decision::Buy { confidence: 0.8 }),
            signal(10, "moderate sell", Decision::Sell { confidence: 0.6 }),
        ];
        let first = evaluate(&signals, &series, &config(6, 10)).unwrap();
        let second = evaluate(&signals, &series, &config(6, 10)).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
