//! Price Oracle
//!
//! Answers price questions in two spaces for one decision cycle:
//! - pool spot prices between every pair of pool tokens
//! - external prices of every token in one reference currency
//!
//! Tables are validated once at construction and never mutated afterwards,
//! so lookups are plain reads. A fresh oracle is built every cycle.

use crate::error::{ArbError, ArbResult};
use crate::pool::calculator::checked_div;
use crate::types::{ExternalPriceTable, SpotPriceTable, TokenAmount};
use rust_decimal::Decimal;

/// Immutable per-cycle price tables
#[derive(Debug, Clone)]
pub struct PriceOracle {
    token_count: usize,
    spot_prices: SpotPriceTable,
    external_currency: String,
    external_prices: ExternalPriceTable,
}

impl PriceOracle {
    /// Validate and wrap the price tables.
    ///
    /// Fails with `InvalidPriceTable` unless the spot table has exactly
    /// `token_count` rows of `token_count - 1` non-zero ratios against the other
    /// tokens, and the external table prices exactly those tokens.
    pub fn new(
        token_count: usize,
        spot_prices: SpotPriceTable,
        external_currency: impl Into<String>,
        external_prices: ExternalPriceTable,
    ) -> ArbResult<Self> {
        if spot_prices.len() != token_count {
            return Err(ArbError::InvalidPriceTable(format!(
                "spot_prices must contain data for {} tokens, got {}",
                token_count,
                spot_prices.len()
            )));
        }

        let counter_count = token_count.saturating_sub(1);
        for (token, row) in &spot_prices {
            if row.len() != counter_count {
                return Err(ArbError::InvalidPriceTable(format!(
                    "{} must have its spot price expressed in {} other tokens, got {}",
                    token,
                    counter_count,
                    row.len()
                )));
            }
            for (other, ratio) in row {
                if other == token || !spot_prices.contains_key(other) {
                    return Err(ArbError::InvalidPriceTable(format!(
                        "{} has a spot price against unexpected token {}",
                        token, other
                    )));
                }
                if ratio.is_zero() {
                    return Err(ArbError::InvalidPriceTable(format!(
                        "spot price of {} against {} is zero",
                        token, other
                    )));
                }
            }
        }

        if external_prices.len() != token_count {
            return Err(ArbError::InvalidPriceTable(format!(
                "external prices must contain data for {} tokens, got {}",
                token_count,
                external_prices.len()
            )));
        }
        if let Some(missing) = spot_prices.keys().find(|t| !external_prices.contains_key(*t)) {
            return Err(ArbError::InvalidPriceTable(format!(
                "no external price for {}",
                missing
            )));
        }

        Ok(Self {
            token_count,
            spot_prices,
            external_currency: external_currency.into(),
            external_prices,
        })
    }

    /// For every other token, how many of it equal one unit of `token`
    /// at the pool's spot price (the reciprocal of the stored ratio).
    pub fn lookup(&self, token: &str) -> ArbResult<Vec<TokenAmount>> {
        let row = self
            .spot_prices
            .get(token)
            .ok_or_else(|| ArbError::UnknownToken(token.to_string()))?;

        row.iter()
            .map(|(other, ratio)| {
                let amount = checked_div(Decimal::ONE, *ratio, "spot price reciprocal")?;
                Ok(TokenAmount::new(other.clone(), amount))
            })
            .collect()
    }

    /// Amount of external currency equal to one unit of `token`
    pub fn external_price(&self, token: &str) -> ArbResult<TokenAmount> {
        self.external_prices
            .get(token)
            .map(|price| TokenAmount::new(self.external_currency.clone(), *price))
            .ok_or_else(|| ArbError::UnknownToken(token.to_string()))
    }

    pub fn external_currency(&self) -> &str {
        &self.external_currency
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn contains(&self, token: &str) -> bool {
        self.spot_prices.contains_key(token)
    }
}
