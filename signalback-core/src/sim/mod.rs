//! Deterministic portfolio simulation and benchmark comparison.

pub mod evaluator;
pub mod simulator;

pub use evaluator::{evaluate, EvalConfig, SimError};
pub use simulator::{PortfolioSimulator, SizingConfig};
