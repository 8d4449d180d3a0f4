//! Weighted AMM Arbitrage Library
//!
//! Decides, once per cycle, whether to trade against a constant-weighted-product
//! pool whose internal prices have drifted from an external market, and how much.

pub mod arbitrage;
pub mod config;
pub mod error;
pub mod pool;
pub mod types;

// Re-export commonly used types
pub use arbitrage::{ArbitrageEngine, PriceOracle, RouteFinder, TradeSizer};
pub use config::{ArbParams, RouteSelection, ScenarioConfig};
pub use error::{ArbError, ArbResult};
pub use pool::{Pool, PoolToken, SwapPricing, WeightedMath};
pub use types::{ArbDecision, MarketState, PotentialArbTrade, TokenAmount};
