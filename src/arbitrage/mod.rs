//! Arbitrage Module
//!
//! Mispricing detection and trade sizing against a single weighted pool:
//! price oracle, route ranking, grid sizing and the per-cycle decision engine.

pub mod engine;
pub mod oracle;
pub mod route_finder;
pub mod trade_sizer;

pub use engine::{ArbitrageEngine, EXECUTION_DELAY_SECS};
pub use oracle::PriceOracle;
pub use route_finder::RouteFinder;
pub use trade_sizer::{LiquidityGrid, TradeSizer};
