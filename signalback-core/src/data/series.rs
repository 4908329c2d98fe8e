//! In-memory sorted price series with the lookup policies the simulator
//! needs: exact match, nearest-strictly-later fallback, and last-known.

use chrono::{Duration, NaiveDate};
use tracing::info;

use super::provider::{DailyClose, DataError, MarketDataProvider};

/// Days of padding added around the requested period when loading, so
/// period-boundary lookups always have data to fall back to.
const LOAD_BUFFER_DAYS: i64 = 30;

/// Daily closes sorted by date, covering a backtest period plus buffer.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    ticker: String,
    closes: Vec<DailyClose>,
}

impl PriceSeries {
    /// Build a series from raw closes; sorts and keeps the first entry
    /// per date if the source reports duplicates.
    pub fn new(ticker: impl Into<String>, mut closes: Vec<DailyClose>) -> Self {
        closes.sort_by_key(|c| c.date);
        closes.dedup_by_key(|c| c.date);
        Self {
            ticker: ticker.into(),
            closes,
        }
    }

    /// Fetch a buffered series for the period from a provider.
    pub fn load(
        provider: &dyn MarketDataProvider,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, DataError> {
        let buffered_start = start - Duration::days(LOAD_BUFFER_DAYS);
        let buffered_end = end + Duration::days(LOAD_BUFFER_DAYS);
        let closes = provider.history(ticker, buffered_start, buffered_end)?;
        if closes.is_empty() {
            return Err(DataError::EmptyHistory {
                ticker: ticker.to_string(),
                start,
                end,
            });
        }
        info!(
            ticker,
            days = closes.len(),
            first = %closes[0].date,
            last = %closes[closes.len() - 1].date,
            "loaded market data"
        );
        Ok(Self::new(ticker, closes))
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Close for the exact date, if the market traded that day.
    pub fn exact(&self, date: NaiveDate) -> Option<DailyClose> {
        self.closes
            .binary_search_by_key(&date, |c| c.date)
            .ok()
            .map(|i| self.closes[i])
    }

    /// Close for the date, or the nearest strictly-later date with data.
    /// Substitutions are logged since they shift the effective trade date.
    pub fn on_or_after(&self, date: NaiveDate) -> Option<DailyClose> {
        let idx = self.closes.partition_point(|c| c.date < date);
        let found = self.closes.get(idx).copied()?;
        if found.date != date {
            info!(
                ticker = %self.ticker,
                requested = %date,
                substituted = %found.date,
                "no data for requested date, using next available"
            );
        }
        Some(found)
    }

    /// Last close in the series.
    pub fn last(&self) -> Option<DailyClose> {
        self.closes.last().copied()
    }
}
