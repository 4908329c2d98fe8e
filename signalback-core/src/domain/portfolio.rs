//! Single-asset portfolio state and its append-only transaction log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::decision::Action;

/// One executed trade. Appended by the simulator, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub action: Action,
    pub shares: f64,
    pub price: f64,
    /// Cash moved: cost for buys, proceeds for sells.
    pub amount: f64,
    /// Confidence that sized the trade.
    pub confidence: f64,
}

/// Cash + share count for a single instrument.
///
/// Built fresh at the start of every simulation; never persisted. The
/// accounting identity `market_value == cash + shares * price` must hold
/// at every snapshot, and neither cash nor shares ever goes negative.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: f64,
    pub shares: f64,
    pub transactions: Vec<Transaction>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            shares: 0.0,
            transactions: Vec::new(),
        }
    }

    /// Mark-to-market value at the given price.
    pub fn market_value(&self, price: f64) -> f64 {
        self.cash + self.shares * price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_portfolio_is_all_cash() {
        let portfolio = Portfolio::new(100_000.0);
        assert_eq!(portfolio.cash, 100_000.0);
        assert_eq!(portfolio.shares, 0.0);
        assert!(portfolio.transactions.is_empty());
        assert_eq!(portfolio.market_value(300.0), 100_000.0);
    }

    #[test]
    fn market_value_includes_shares() {
        let mut portfolio = Portfolio::new(84_000.0);
        portfolio.shares = 50.0;
        assert_eq!(portfolio.market_value(320.0), 84_000.0 + 50.0 * 320.0);
    }
}
