//! Analysis-date scheduling and trading-day resolution.
//!
//! The scheduler produces the calendar of candidate analysis dates
//! (weekly on an anchor weekday, or daily), and the trading calendar
//! resolves each candidate to a date the market actually traded, using
//! the market-data provider as the source of truth.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::warn;

use crate::data::MarketDataProvider;

/// Days probed on each side of a date when checking tradability.
const TRADING_DAY_WINDOW: i64 = 5;

/// Upper bound on forward steps when resolving the next trading day.
const MAX_RESOLUTION_ATTEMPTS: u32 = 10;

/// All dates in `[start, end]` falling on `anchor`, starting from the
/// first such date on or after `start`, at weekly intervals.
pub fn weekly_dates(start: NaiveDate, end: NaiveDate, anchor: Weekday) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current.weekday() != anchor {
        current += Duration::days(1);
    }
    while current <= end {
        dates.push(current);
        current += Duration::days(7);
    }
    dates
}

/// Every calendar date in `[start, end]`.
pub fn daily_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        current += Duration::days(1);
    }
    dates
}

/// Trading-day predicate and resolution backed by a market-data provider.
pub struct TradingCalendar<'a> {
    provider: &'a dyn MarketDataProvider,
    ticker: String,
}

impl<'a> TradingCalendar<'a> {
    pub fn new(provider: &'a dyn MarketDataProvider, ticker: impl Into<String>) -> Self {
        Self {
            provider,
            ticker: ticker.into(),
        }
    }

    /// Whether the market traded on `date`, judged by the provider
    /// reporting a close for that exact date within a small window.
    ///
    /// Fail-open: a provider error is logged and the date is treated as
    /// tradable, so a flaky provider cannot stall the whole schedule. The
    /// cost is that a holiday can slip through during an outage.
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        let start = date - Duration::days(TRADING_DAY_WINDOW);
        let end = date + Duration::days(TRADING_DAY_WINDOW);
        match self.provider.history(&self.ticker, start, end) {
            Ok(closes) => closes.iter().any(|c| c.date == date),
            Err(e) => {
                warn!(
                    ticker = %self.ticker,
                    date = %date,
                    error = %e,
                    "trading-day check failed, assuming tradable"
                );
                true
            }
        }
    }

    /// First trading day on or after `date`, stepping one day at a time.
    ///
    /// Bounded by a retry ceiling; if no trading day is found within the
    /// ceiling the last attempted date is returned (and logged) rather
    /// than failing the run.
    pub fn next_trading_day(&self, date: NaiveDate) -> NaiveDate {
        let mut current = date;
        let mut attempts = 0;
        while !self.is_trading_day(current) && attempts < MAX_RESOLUTION_ATTEMPTS {
            current += Duration::days(1);
            attempts += 1;
        }
        if attempts == MAX_RESOLUTION_ATTEMPTS {
            warn!(
                ticker = %self.ticker,
                requested = %date,
                resolved = %current,
                "trading-day resolution hit the attempt ceiling"
            );
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DailyClose, DataError};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Provider with a fixed set of trading days, or a permanent error.
    struct FixedProvider {
        days: Vec<NaiveDate>,
        failing: bool,
    }

    impl MarketDataProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn history(
            &self,
            _ticker: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<DailyClose>, DataError> {
            if self.failing {
                return Err(DataError::NetworkUnreachable("down".into()));
            }
            Ok(self
                .days
                .iter()
                .filter(|d| **d >= start && **d <= end)
                .map(|d| DailyClose {
                    date: *d,
                    close: 100.0,
                })
                .collect())
        }
    }

    #[test]
    fn weekly_dates_start_on_first_anchor() {
        // 2024-05-01 is a Wednesday; first Monday on/after is 2024-05-06.
        let dates = weekly_dates(date(2024, 5, 1), date(2024, 5, 31), Weekday::Mon);
        assert_eq!(
            dates,
            vec![
                date(2024, 5, 6),
                date(2024, 5, 13),
                date(2024, 5, 20),
                date(2024, 5, 27),
            ]
        );
    }

    #[test]
    fn weekly_dates_inclusive_of_end() {
        let dates = weekly_dates(date(2024, 5, 6), date(2024, 5, 6), Weekday::Mon);
        assert_eq!(dates, vec![date(2024, 5, 6)]);
    }

    #[test]
    fn weekly_dates_empty_when_no_anchor_in_range() {
        let dates = weekly_dates(date(2024, 5, 1), date(2024, 5, 4), Weekday::Mon);
        assert!(dates.is_empty());
    }

    #[test]
    fn daily_dates_cover_every_day() {
        let dates = daily_dates(date(2024, 5, 1), date(2024, 5, 3));
        assert_eq!(dates.len(), 3);
    }

    #[test]
    fn is_trading_day_requires_exact_date() {
        let provider = FixedProvider {
            days: vec![date(2024, 5, 7)],
            failing: false,
        };
        let calendar = TradingCalendar::new(&provider, "QQQ");
        assert!(!calendar.is_trading_day(date(2024, 5, 6)));
        assert!(calendar.is_trading_day(date(2024, 5, 7)));
    }

    #[test]
    fn is_trading_day_fails_open_on_provider_error() {
        let provider = FixedProvider {
            days: vec![],
            failing: true,
        };
        let calendar = TradingCalendar::new(&provider, "QQQ");
        assert!(calendar.is_trading_day(date(2024, 5, 6)));
    }

    #[test]
    fn next_trading_day_skips_to_first_tradable() {
        let provider = FixedProvider {
            days: vec![date(2024, 5, 8)],
            failing: false,
        };
        let calendar = TradingCalendar::new(&provider, "QQQ");
        assert_eq!(calendar.next_trading_day(date(2024, 5, 6)), date(2024, 5, 8));
    }

    #[test]
    fn next_trading_day_returns_last_attempt_at_ceiling() {
        let provider = FixedProvider {
            days: vec![],
            failing: false,
        };
        let calendar = TradingCalendar::new(&provider, "QQQ");
        // No trading days at all: ten forward steps, then give up.
        assert_eq!(
            calendar.next_trading_day(date(2024, 5, 6)),
            date(2024, 5, 16)
        );
    }
}
