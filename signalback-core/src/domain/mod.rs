//! Domain types for signal backtesting.

pub mod decision;
pub mod portfolio;
pub mod results;
pub mod signal;

pub use decision::{Action, Decision};
pub use portfolio::{Portfolio, Transaction};
pub use results::{
    BacktestResults, FinalPortfolio, FinalValues, Outperformance, Period, PortfolioSnapshot,
    Returns, RESULTS_SCHEMA_VERSION,
};
pub use signal::{OracleConfigSnapshot, Signal};
