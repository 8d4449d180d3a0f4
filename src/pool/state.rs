//! Pool State
//!
//! Read-only view of a weighted pool: per-token balance and denormalized
//! weight plus the pool-wide swap fee. The arbitrage core never mutates it;
//! it only proposes swaps for an execution layer to apply.

use super::calculator::SwapPricing;
use crate::error::{ArbError, ArbResult};
use crate::types::SpotPriceTable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One token's slot in a weighted pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolToken {
    pub balance: Decimal,
    pub denorm_weight: Decimal,
}

impl PoolToken {
    pub fn new(balance: Decimal, denorm_weight: Decimal) -> Self {
        Self {
            balance,
            denorm_weight,
        }
    }
}

/// Weighted pool keyed by token symbol
///
/// Tokens are kept in a `BTreeMap` so every iteration over the pool (route
/// search, spot table derivation) visits symbols in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub tokens: BTreeMap<String, PoolToken>,
    pub swap_fee: Decimal,
}

impl Pool {
    pub fn new(tokens: BTreeMap<String, PoolToken>, swap_fee: Decimal) -> Self {
        Self { tokens, swap_fee }
    }

    /// Look up a token, failing with `UnknownToken` if it is not in the pool
    pub fn token(&self, symbol: &str) -> ArbResult<&PoolToken> {
        self.tokens
            .get(symbol)
            .ok_or_else(|| ArbError::UnknownToken(symbol.to_string()))
    }

    /// Token symbols in pool order
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Derive the spot price table from balances and weights.
    ///
    /// Entry `[a][b]` is the spot price of `b` denominated in `a`, i.e. how
    /// many `a` one `b` costs inside the pool.
    pub fn spot_prices<P: SwapPricing>(&self, pricing: &P) -> ArbResult<SpotPriceTable> {
        let mut table = SpotPriceTable::new();

        for (a, token_a) in &self.tokens {
            let mut row = BTreeMap::new();
            for (b, token_b) in &self.tokens {
                if a == b {
                    continue;
                }
                let price = pricing.spot_price(
                    token_a.balance,
                    token_a.denorm_weight,
                    token_b.balance,
                    token_b.denorm_weight,
                    self.swap_fee,
                )?;
                row.insert(b.clone(), price);
            }
            table.insert(a.clone(), row);
        }

        debug!("Derived spot prices for {} tokens", table.len());
        Ok(table)
    }
}
