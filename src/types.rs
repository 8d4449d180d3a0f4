// Core data structures shared by the oracle, route finder, sizer and engine

use crate::error::{ArbError, ArbResult};
use crate::pool::Pool;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// token -> (other token -> ratio)
pub type SpotPriceTable = BTreeMap<String, BTreeMap<String, Decimal>>;

/// token -> price in the external reference currency
pub type ExternalPriceTable = BTreeMap<String, Decimal>;

/// An amount of a named token (or of the external currency)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub symbol: String,
    pub amount: Decimal,
}

impl TokenAmount {
    pub fn new(symbol: impl Into<String>, amount: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            amount,
        }
    }

    /// Convert into another denomination: `self` units times `price` per unit.
    /// The result carries the price's symbol.
    pub fn convert(&self, price: &TokenAmount) -> ArbResult<TokenAmount> {
        let amount = self.amount.checked_mul(price.amount).ok_or_else(|| {
            ArbError::Math(format!("overflow converting {} at {}", self, price))
        })?;
        Ok(TokenAmount::new(price.symbol.clone(), amount))
    }

    /// Scalar ratio `self / other`
    pub fn ratio(&self, other: &TokenAmount) -> ArbResult<Decimal> {
        self.amount
            .checked_div(other.amount)
            .ok_or_else(|| ArbError::Math(format!("cannot divide {} by {}", self, other)))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.symbol)
    }
}

/// A trade direction through the pool, without a size
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArbRoute {
    pub token_in: String,
    pub token_out: String,
}

impl ArbRoute {
    pub fn new(token_in: impl Into<String>, token_out: impl Into<String>) -> Self {
        Self {
            token_in: token_in.into(),
            token_out: token_out.into(),
        }
    }
}

impl fmt::Display for ArbRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.token_in, self.token_out)
    }
}

/// A route plus its mispricing score (external price / pool-implied value, < 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRoute {
    pub route: ArbRoute,
    pub score: Decimal,
}

/// A fully sized trade hypothesis for one grid point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotentialArbTrade {
    pub token_in: String,
    pub token_amount_in: Decimal,
    /// External-currency notional that produced `token_amount_in`
    pub liquidity_in: Decimal,
    pub token_out: String,
    pub token_amount_out: Decimal,
    pub transaction_cost: Decimal,
    /// External value of the output minus the transaction cost
    pub profit: Decimal,
}

impl fmt::Display for PotentialArbTrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} {} -> {:.3} {}, profit {:.3}",
            self.token_amount_in, self.token_in, self.token_amount_out, self.token_out, self.profit
        )
    }
}

/// Snapshot of everything one decision cycle reads
#[derive(Debug, Clone)]
pub struct MarketState {
    pub pool: Pool,
    pub spot_prices: SpotPriceTable,
    pub token_prices: ExternalPriceTable,
    /// Fixed transaction cost in external currency
    pub gas_cost: Decimal,
    pub change_datetime: DateTime<Utc>,
    pub timestep: u64,
}

/// Input half of a swap instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapExactAmountInInput {
    pub token_in: TokenAmount,
    pub min_token_out: TokenAmount,
}

/// Expected output half of a swap instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapExactAmountInOutput {
    pub token_out: TokenAmount,
}

/// Swap input paired with its expected output
pub type PoolUpdate = (SwapExactAmountInInput, SwapExactAmountInOutput);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Swap,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Swap => write!(f, "swap"),
        }
    }
}

/// Outcome of one decision cycle; all fields are null for a no-trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbDecision {
    pub pool_update: Option<PoolUpdate>,
    pub change_datetime_update: Option<DateTime<Utc>>,
    pub action_type: Option<ActionType>,
}

impl ArbDecision {
    pub fn no_trade() -> Self {
        Self {
            pool_update: None,
            change_datetime_update: None,
            action_type: None,
        }
    }

    pub fn swap(update: PoolUpdate, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            pool_update: Some(update),
            change_datetime_update: Some(scheduled_at),
            action_type: Some(ActionType::Swap),
        }
    }

    pub fn is_trade(&self) -> bool {
        self.action_type.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_token_amount_convert() {
        let b_per_a = TokenAmount::new("B", dec!(2));
        let usd_per_b = TokenAmount::new("USD", dec!(1.5));

        let value = b_per_a.convert(&usd_per_b).unwrap();
        assert_eq!(value, TokenAmount::new("USD", dec!(3)));
    }

    #[test]
    fn test_token_amount_ratio() {
        let a = TokenAmount::new("USD", dec!(0.5));
        let b = TokenAmount::new("USD", dec!(2));
        assert_eq!(a.ratio(&b).unwrap(), dec!(0.25));
        assert!(matches!(a.ratio(&TokenAmount::new("USD", Decimal::ZERO)), Err(ArbError::Math(_))));
    }

    #[test]
    fn test_no_trade_serializes_nulls() {
        let json = serde_json::to_value(ArbDecision::no_trade()).unwrap();
        assert!(json["pool_update"].is_null());
        assert!(json["change_datetime_update"].is_null());
        assert!(json["action_type"].is_null());
    }

    #[test]
    fn test_swap_decision_serializes_action_type() {
        let update = (
            SwapExactAmountInInput {
                token_in: TokenAmount::new("A", dec!(10)),
                min_token_out: TokenAmount::new("B", Decimal::ZERO),
            },
            SwapExactAmountInOutput {
                token_out: TokenAmount::new("B", dec!(9)),
            },
        );
        let decision = ArbDecision::swap(update, Utc::now());
        assert!(decision.is_trade());

        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["action_type"], "swap");
        assert_eq!(json["pool_update"][0]["token_in"]["symbol"], "A");
        assert_eq!(json["pool_update"][1]["token_out"]["symbol"], "B");
    }
}
