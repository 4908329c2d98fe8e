//! Signalback Core — engine for backtesting periodic trading recommendations.
//!
//! This crate contains the deterministic half of the system:
//! - Domain types (signals, decisions, transactions, portfolio, results)
//! - Keyword interpreter turning free-text recommendations into decisions
//! - Analysis-date scheduler and trading-day resolution
//! - Market-data provider abstraction with a Yahoo Finance implementation
//! - Confidence-sized portfolio simulator
//! - Performance evaluation against a fixed-share buy-and-hold benchmark
//!
//! The resumable signal-generation workflow and its persistence live in
//! `signalback-runner`; this crate stays free of durable state.

pub mod data;
pub mod domain;
pub mod interpret;
pub mod oracle;
pub mod schedule;
pub mod sim;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types cross thread boundaries freely.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::Decision>();
        require_sync::<domain::Decision>();
        require_send::<domain::Portfolio>();
        require_sync::<domain::Portfolio>();
        require_send::<domain::BacktestResults>();
        require_sync::<domain::BacktestResults>();
        require_send::<data::PriceSeries>();
        require_sync::<data::PriceSeries>();
    }
}
