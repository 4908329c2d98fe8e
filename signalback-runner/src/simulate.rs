//! Simulation orchestration: persisted signals + market data → results.

use thiserror::Error;
use tracing::info;

use signalback_core::data::{DataError, MarketDataProvider, PriceSeries};
use signalback_core::domain::BacktestResults;
use signalback_core::sim::{evaluate, EvalConfig, SimError};

use crate::config::RunConfig;
use crate::store::SignalStore;

/// Errors from the simulation phase.
#[derive(Debug, Error)]
pub enum SimulateError {
    #[error("market data error: {0}")]
    Data(#[from] DataError),

    #[error("simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("no persisted signals to simulate; run signal generation first")]
    NoSignals,
}

/// Replay the store's signals against fresh price history.
///
/// Read-only with respect to the store, so it can be re-run with
/// different capital or sizing without re-invoking the oracle.
pub fn run_simulation(
    config: &RunConfig,
    store: &SignalStore,
    provider: &dyn MarketDataProvider,
) -> Result<BacktestResults, SimulateError> {
    let signals = store.load_all();
    if signals.is_empty() {
        return Err(SimulateError::NoSignals);
    }

    let series = PriceSeries::load(provider, &config.ticker, config.start_date, config.end_date)?;

    info!(
        signals = signals.len(),
        ticker = %config.ticker,
        "simulating persisted signals"
    );

    let eval = EvalConfig {
        start_date: config.start_date,
        end_date: config.end_date,
        initial_capital: config.initial_capital,
        sizing: config.sizing,
    };
    let mut results = evaluate(&signals, &series, &eval)?;
    results.run_id = config.run_id();
    Ok(results)
}
