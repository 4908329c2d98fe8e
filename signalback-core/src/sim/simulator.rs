//! Confidence-sized portfolio simulator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Action, Decision, Portfolio, Transaction};

/// Position-sizing rules. Defaults match the reference strategy: at most
/// 20% of portfolio value per buy, at most 50% of holdings per sell, both
/// scaled by decision confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Maximum fraction of portfolio value committed by a single buy.
    pub max_position_pct: f64,
    /// Buys below this dollar amount are dropped.
    pub min_trade_amount: f64,
    /// Maximum fraction of holdings released by a single sell.
    pub max_sell_ratio: f64,
    /// Sells below this share count are dropped.
    pub min_sell_shares: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            max_position_pct: 0.20,
            min_trade_amount: 100.0,
            max_sell_ratio: 0.50,
            min_sell_shares: 0.01,
        }
    }
}

/// Replays decisions against prices, one portfolio state at a time.
///
/// Structural invariants: a buy spends `min(value * pct * confidence,
/// cash)` so cash never goes negative, and a sell releases a fraction of
/// current holdings so shares never go negative.
#[derive(Debug, Clone)]
pub struct PortfolioSimulator {
    portfolio: Portfolio,
    sizing: SizingConfig,
}

impl PortfolioSimulator {
    pub fn new(initial_capital: f64, sizing: SizingConfig) -> Self {
        Self {
            portfolio: Portfolio::new(initial_capital),
            sizing,
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Mark-to-market value at the given price.
    pub fn value_at(&self, price: f64) -> f64 {
        self.portfolio.market_value(price)
    }

    /// Apply one decision at the given price and date.
    ///
    /// Sizing uses the portfolio value marked to market at this date's
    /// price, computed before the trade, never a stale prior-date value.
    /// Returns the executed transaction, or `None` for holds and trades
    /// below the minimum thresholds.
    pub fn apply(&mut self, decision: Decision, price: f64, date: NaiveDate) -> Option<Transaction> {
        match decision {
            Decision::Buy { confidence } => self.buy(confidence, price, date),
            Decision::Sell { confidence } => self.sell(confidence, price, date),
            Decision::Hold => None,
        }
    }

    fn buy(&mut self, confidence: f64, price: f64, date: NaiveDate) -> Option<Transaction> {
        let total_value = self.portfolio.market_value(price);
        let sized = total_value * self.sizing.max_position_pct * confidence;
        let trade_amount = sized.min(self.portfolio.cash);

        if trade_amount < self.sizing.min_trade_amount {
            return None;
        }

        let shares_bought = trade_amount / price;
        self.portfolio.cash -= trade_amount;
        self.portfolio.shares += shares_bought;

        let transaction = Transaction {
            date,
            action: Action::Buy,
            shares: shares_bought,
            price,
            amount: trade_amount,
            confidence,
        };
        self.portfolio.transactions.push(transaction.clone());
        Some(transaction)
    }

    fn sell(&mut self, confidence: f64, price: f64, date: NaiveDate) -> Option<Transaction> {
        if self.portfolio.shares <= 0.0 {
            return None;
        }

        let sell_fraction = self.sizing.max_sell_ratio * confidence;
        let shares_to_sell = self.portfolio.shares * sell_fraction;

        if shares_to_sell < self.sizing.min_sell_shares {
            return None;
        }

        let proceeds = shares_to_sell * price;
        self.portfolio.cash += proceeds;
        self.portfolio.shares -= shares_to_sell;

        let transaction = Transaction {
            date,
            action: Action::Sell,
            shares: shares_to_sell,
            price,
            amount: proceeds,
            confidence,
        };
        self.portfolio.transactions.push(transaction.clone());
        Some(transaction)
    }
}
