//! Error types for the arbitrage core
//!
//! One error enum covers oracle validation, parameter validation and the
//! arithmetic failures surfaced by the pricing curve. A no-trade outcome is
//! never an error; it is an `ArbDecision::no_trade()`.

use thiserror::Error;

/// Errors raised while building prices, sizing trades or deciding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbError {
    /// Spot or external price tables have the wrong shape
    #[error("Invalid price table: {0}")]
    InvalidPriceTable(String),

    /// A token was referenced that the pool or oracle does not know
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Grid or engine parameters cannot be used
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Division by zero, overflow, or an input outside the curve's domain
    #[error("Math error: {0}")]
    Math(String),
}

/// Result alias used across the library
pub type ArbResult<T> = Result<T, ArbError>;
