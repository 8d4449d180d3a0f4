//! Pool module
//!
//! Boundary to the weighted AMM: pool state (balances, weights, fee) and the
//! constant-weighted-product pricing curve the arbitrage core sizes against.

pub mod calculator;
pub mod state;

pub use calculator::{SwapPricing, WeightedMath, MAX_IN_RATIO};
pub use state::{Pool, PoolToken};
