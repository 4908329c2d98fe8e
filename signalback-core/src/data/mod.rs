//! Market data: provider abstraction, Yahoo implementation, price series.

pub mod provider;
pub mod series;
pub mod yahoo;

pub use provider::{DailyClose, DataError, MarketDataProvider};
pub use series::PriceSeries;
pub use yahoo::YahooProvider;
