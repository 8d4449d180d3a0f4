//! Weighted Pool Price Calculator
//!
//! Pricing curve for constant-weighted-product pools (x^w1 * y^w2 = k)
//! with a proportional swap fee on the input side.
//!
//! The arbitrage core only talks to the curve through [`SwapPricing`], so
//! tests can swap in synthetic pricing without touching pool math.

use crate::error::{ArbError, ArbResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use tracing::debug;

/// Maximum fraction of a token's pool balance a single swap may take as input
pub const MAX_IN_RATIO: Decimal = Decimal::from_parts(5, 0, 0, false, 1); // 0.5

/// Pricing capability consumed by the trade sizer
pub trait SwapPricing {
    /// Amount of token_out received for `amount_in` of token_in
    fn out_given_in(
        &self,
        balance_in: Decimal,
        weight_in: Decimal,
        balance_out: Decimal,
        weight_out: Decimal,
        amount_in: Decimal,
        swap_fee: Decimal,
    ) -> ArbResult<Decimal>;

    /// Spot price of token_out denominated in token_in (units of in per 1 out)
    fn spot_price(
        &self,
        balance_in: Decimal,
        weight_in: Decimal,
        balance_out: Decimal,
        weight_out: Decimal,
        swap_fee: Decimal,
    ) -> ArbResult<Decimal>;
}

/// Constant-weighted-product curve
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedMath;

impl WeightedMath {
    pub fn new() -> Self {
        Self
    }
}

impl SwapPricing for WeightedMath {
    /// out = B_o * (1 - (B_i / (B_i + A_i * (1 - fee)))^(W_i / W_o))
    fn out_given_in(
        &self,
        balance_in: Decimal,
        weight_in: Decimal,
        balance_out: Decimal,
        weight_out: Decimal,
        amount_in: Decimal,
        swap_fee: Decimal,
    ) -> ArbResult<Decimal> {
        require_positive("balance_in", balance_in)?;
        require_positive("weight_in", weight_in)?;
        require_positive("balance_out", balance_out)?;
        require_positive("weight_out", weight_out)?;
        require_fee(swap_fee)?;
        if amount_in.is_sign_negative() {
            return Err(ArbError::Math(format!("amount_in must not be negative, got {}", amount_in)));
        }

        let weight_ratio = checked_div(weight_in, weight_out, "weight ratio")?;
        let adjusted_in = checked_mul(amount_in, Decimal::ONE - swap_fee, "fee adjustment")?;
        let denominator = balance_in
            .checked_add(adjusted_in)
            .ok_or_else(|| ArbError::Math("overflow adding input to balance".to_string()))?;
        let y = checked_div(balance_in, denominator, "balance ratio")?;
        let ratio_pow = checked_pow(y, weight_ratio)?;
        let amount_out = checked_mul(balance_out, Decimal::ONE - ratio_pow, "amount out")?;

        debug!(
            "out_given_in: in={} (B={}, W={}) -> out={} (B={}, W={}), fee={}",
            amount_in, balance_in, weight_in, amount_out, balance_out, weight_out, swap_fee
        );

        Ok(amount_out)
    }

    /// sp = (B_i / W_i) / (B_o / W_o) * 1 / (1 - fee)
    fn spot_price(
        &self,
        balance_in: Decimal,
        weight_in: Decimal,
        balance_out: Decimal,
        weight_out: Decimal,
        swap_fee: Decimal,
    ) -> ArbResult<Decimal> {
        require_positive("balance_in", balance_in)?;
        require_positive("weight_in", weight_in)?;
        require_positive("balance_out", balance_out)?;
        require_positive("weight_out", weight_out)?;
        require_fee(swap_fee)?;

        let numer = checked_div(balance_in, weight_in, "spot numerator")?;
        let denom = checked_div(balance_out, weight_out, "spot denominator")?;
        let ratio = checked_div(numer, denom, "spot ratio")?;
        checked_div(ratio, Decimal::ONE - swap_fee, "spot fee scale")
    }
}

/// Division that reports a zero divisor or overflow instead of panicking
pub(crate) fn checked_div(numer: Decimal, denom: Decimal, what: &str) -> ArbResult<Decimal> {
    numer
        .checked_div(denom)
        .ok_or_else(|| ArbError::Math(format!("cannot divide {} by {} ({})", numer, denom, what)))
}

/// Multiplication that reports overflow instead of panicking
pub(crate) fn checked_mul(a: Decimal, b: Decimal, what: &str) -> ArbResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| ArbError::Math(format!("overflow multiplying {} by {} ({})", a, b, what)))
}

/// Integral exponents use exact integer powers; fractional ones go through powd
fn checked_pow(base: Decimal, exp: Decimal) -> ArbResult<Decimal> {
    let result = if exp.fract().is_zero() {
        exp.to_u64().and_then(|n| base.checked_powu(n))
    } else {
        base.checked_powd(exp)
    };
    result.ok_or_else(|| ArbError::Math(format!("cannot raise {} to {}", base, exp)))
}

fn require_positive(name: &str, value: Decimal) -> ArbResult<()> {
    if value <= Decimal::ZERO {
        return Err(ArbError::Math(format!("{} must be positive, got {}", name, value)));
    }
    Ok(())
}

fn require_fee(swap_fee: Decimal) -> ArbResult<()> {
    if swap_fee.is_sign_negative() || swap_fee >= Decimal::ONE {
        return Err(ArbError::Math(format!("swap fee must be in [0, 1), got {}", swap_fee)));
    }
    Ok(())
}
