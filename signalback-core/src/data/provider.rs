//! Market-data provider trait and structured error types.
//!
//! The provider abstracts over price sources (Yahoo Finance over HTTP,
//! fixed series in tests) so the scheduler and simulator never care where
//! closes come from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// Errors from market-data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no price data for '{ticker}' between {start} and {end}")]
    EmptyHistory {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// Trait for daily price history sources.
///
/// Implementations return closes ordered by date, one entry per day the
/// market actually traded. The trading-day predicate is built on that:
/// a date is tradable iff the provider reports it.
pub trait MarketDataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily closes for a ticker over an inclusive date range.
    fn history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>, DataError>;
}
