//! Interpreted trading decisions.

use serde::{Deserialize, Serialize};

/// Trade direction for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::Hold => "hold",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured trading decision produced by the interpreter.
///
/// Closed variant: downstream code never sees raw recommendation text,
/// only this tagged form. `Hold` carries no confidence because it never
/// sizes a trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Decision {
    Buy { confidence: f64 },
    Sell { confidence: f64 },
    Hold,
}

impl Decision {
    pub fn action(&self) -> Action {
        match self {
            Decision::Buy { .. } => Action::Buy,
            Decision::Sell { .. } => Action::Sell,
            Decision::Hold => Action::Hold,
        }
    }

    /// Confidence used for trade sizing; `None` for holds.
    pub fn confidence(&self) -> Option<f64> {
        match self {
            Decision::Buy { confidence } | Decision::Sell { confidence } => Some(*confidence),
            Decision::Hold => None,
        }
    }
}
