//! Trade Sizer
//!
//! Brute-force grid search over the external-currency notional of a trade.
//! Every grid point is priced through the pool curve and recorded; nothing is
//! filtered here. Profit is usually unimodal in size (price impact grows while
//! the transaction cost is fixed) but the search does not rely on it.

use super::oracle::PriceOracle;
use crate::config::ArbParams;
use crate::error::{ArbError, ArbResult};
use crate::pool::calculator::checked_mul;
use crate::pool::{Pool, SwapPricing};
use crate::types::{ArbRoute, PotentialArbTrade};
use rust_decimal::Decimal;
use tracing::debug;

/// Half-open notional grid `[min, max)` with a positive step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityGrid {
    min: Decimal,
    max: Decimal,
    step: Decimal,
}

impl LiquidityGrid {
    pub fn new(min: Decimal, max: Decimal, step: Decimal) -> ArbResult<Self> {
        if step <= Decimal::ZERO {
            return Err(ArbError::InvalidParams(format!(
                "grid step must be positive, got {}",
                step
            )));
        }
        Ok(Self { min, max, step })
    }

    pub fn from_params(params: &ArbParams) -> ArbResult<Self> {
        Self::new(
            params.min_arb_liquidity,
            params.max_arb_liquidity,
            params.arb_liquidity_granularity,
        )
    }

    /// min, min + step, min + 2 * step, ... while below max
    pub fn points(&self) -> impl Iterator<Item = Decimal> {
        let (max, step) = (self.max, self.step);
        std::iter::successors(Some(self.min), move |l| l.checked_add(step))
            .take_while(move |l| *l < max)
    }
}

/// Prices one route across the liquidity grid
pub struct TradeSizer<'a, P: SwapPricing> {
    pool: &'a Pool,
    pricing: &'a P,
    oracle: &'a PriceOracle,
}

impl<'a, P: SwapPricing> TradeSizer<'a, P> {
    pub fn new(pool: &'a Pool, pricing: &'a P, oracle: &'a PriceOracle) -> Self {
        Self {
            pool,
            pricing,
            oracle,
        }
    }

    /// One record per grid point, in increasing notional order
    pub fn size(
        &self,
        route: &ArbRoute,
        grid: &LiquidityGrid,
        transaction_cost: Decimal,
    ) -> ArbResult<Vec<PotentialArbTrade>> {
        let pool_in = self.pool.token(&route.token_in)?;
        let pool_out = self.pool.token(&route.token_out)?;
        let price_in = self.oracle.external_price(&route.token_in)?.amount;
        let price_out = self.oracle.external_price(&route.token_out)?.amount;

        let mut trades = Vec::new();
        for liquidity in grid.points() {
            let token_amount_in = checked_mul(price_in, liquidity, "notional to token_in")?;
            let token_amount_out = self.pricing.out_given_in(
                pool_in.balance,
                pool_in.denorm_weight,
                pool_out.balance,
                pool_out.denorm_weight,
                token_amount_in,
                self.pool.swap_fee,
            )?;
            let value_out = checked_mul(price_out, token_amount_out, "token_out to notional")?;
            let profit = value_out.checked_sub(transaction_cost).ok_or_else(|| {
                ArbError::Math(format!("overflow subtracting cost {} from {}", transaction_cost, value_out))
            })?;

            let trade = PotentialArbTrade {
                token_in: route.token_in.clone(),
                token_amount_in,
                liquidity_in: liquidity,
                token_out: route.token_out.clone(),
                token_amount_out,
                transaction_cost,
                profit,
            };
            debug!("Grid point {}: {}", liquidity, trade);
            trades.push(trade);
        }

        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{PoolToken, WeightedMath};
    use crate::types::{ExternalPriceTable, SpotPriceTable};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    /// Fixed-rate pricing: out = in * rate, no price impact
    struct FixedRate(Decimal);

    impl SwapPricing for FixedRate {
        fn out_given_in(
            &self,
            _balance_in: Decimal,
            _weight_in: Decimal,
            _balance_out: Decimal,
            _weight_out: Decimal,
            amount_in: Decimal,
            _swap_fee: Decimal,
        ) -> ArbResult<Decimal> {
            Ok(amount_in * self.0)
        }

        fn spot_price(
            &self,
            _balance_in: Decimal,
            _weight_in: Decimal,
            _balance_out: Decimal,
            _weight_out: Decimal,
            _swap_fee: Decimal,
        ) -> ArbResult<Decimal> {
            Ok(Decimal::ONE / self.0)
        }
    }

    /// Pricing that always fails, to check propagation
    struct Broken;

    impl SwapPricing for Broken {
        fn out_given_in(
            &self,
            _: Decimal,
            _: Decimal,
            _: Decimal,
            _: Decimal,
            _: Decimal,
            _: Decimal,
        ) -> ArbResult<Decimal> {
            Err(ArbError::Math("broken curve".to_string()))
        }

        fn spot_price(&self, _: Decimal, _: Decimal, _: Decimal, _: Decimal, _: Decimal) -> ArbResult<Decimal> {
            Err(ArbError::Math("broken curve".to_string()))
        }
    }

    fn two_token_setup(balance: Decimal) -> (Pool, PriceOracle) {
        let tokens: BTreeMap<String, PoolToken> = [
            ("A".to_string(), PoolToken::new(balance, dec!(1))),
            ("B".to_string(), PoolToken::new(balance, dec!(1))),
        ]
        .into_iter()
        .collect();
        let pool = Pool::new(tokens, Decimal::ZERO);

        let mut spot = SpotPriceTable::new();
        spot.insert("A".to_string(), [("B".to_string(), dec!(1))].into_iter().collect());
        spot.insert("B".to_string(), [("A".to_string(), dec!(1))].into_iter().collect());
        let external: ExternalPriceTable = [("A".to_string(), dec!(0.5)), ("B".to_string(), dec!(1))]
            .into_iter()
            .collect();
        let oracle = PriceOracle::new(2, spot, "USD", external).unwrap();

        (pool, oracle)
    }

    #[test]
    fn test_grid_points() {
        let grid = LiquidityGrid::new(dec!(1000), dec!(5000), dec!(1000)).unwrap();
        let points: Vec<Decimal> = grid.points().collect();
        assert_eq!(points, vec![dec!(1000), dec!(2000), dec!(3000), dec!(4000)]);
    }

    #[test]
    fn test_grid_point_count_is_ceiling() {
        for (min, max, step, expected) in [
            (dec!(0), dec!(10), dec!(3), 4),     // 0 3 6 9
            (dec!(0), dec!(9), dec!(3), 3),      // 0 3 6
            (dec!(1), dec!(2), dec!(0.25), 4),   // 1 1.25 1.5 1.75
            (dec!(5), dec!(5), dec!(1), 0),
            (dec!(6), dec!(5), dec!(1), 0),
        ] {
            let grid = LiquidityGrid::new(min, max, step).unwrap();
            assert_eq!(grid.points().count(), expected, "[{}, {}) step {}", min, max, step);
        }
    }

    #[test]
    fn test_grid_rejects_non_positive_step() {
        assert!(matches!(
            LiquidityGrid::new(dec!(0), dec!(10), Decimal::ZERO),
            Err(ArbError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_one_record_per_point_in_order() {
        let (pool, oracle) = two_token_setup(dec!(10000));
        let pricing = FixedRate(dec!(1));
        let sizer = TradeSizer::new(&pool, &pricing, &oracle);
        let grid = LiquidityGrid::new(dec!(0), dec!(10), dec!(3)).unwrap();

        let trades = sizer.size(&ArbRoute::new("A", "B"), &grid, dec!(1)).unwrap();

        assert_eq!(trades.len(), 4);
        for pair in trades.windows(2) {
            assert!(pair[0].liquidity_in < pair[1].liquidity_in);
        }
    }

    #[test]
    fn test_record_fields() {
        let (pool, oracle) = two_token_setup(dec!(10000));
        let pricing = FixedRate(dec!(2));
        let sizer = TradeSizer::new(&pool, &pricing, &oracle);
        let grid = LiquidityGrid::new(dec!(100), dec!(101), dec!(1)).unwrap();

        let trades = sizer.size(&ArbRoute::new("A", "B"), &grid, dec!(3)).unwrap();
        let trade = &trades[0];

        // amount_in = 0.5 * 100, out = 2 * 50, value = 1 * 100, profit = 100 - 3
        assert_eq!(trade.token_in, "A");
        assert_eq!(trade.token_out, "B");
        assert_eq!(trade.liquidity_in, dec!(100));
        assert_eq!(trade.token_amount_in, dec!(50));
        assert_eq!(trade.token_amount_out, dec!(100));
        assert_eq!(trade.transaction_cost, dec!(3));
        assert_eq!(trade.profit, dec!(97));
    }

    #[test]
    fn test_weighted_curve_profit_grows_with_size() {
        let (pool, oracle) = two_token_setup(dec!(10000));
        let pricing = WeightedMath::new();
        let sizer = TradeSizer::new(&pool, &pricing, &oracle);
        let grid = LiquidityGrid::new(dec!(1000), dec!(5000), dec!(1000)).unwrap();

        let trades = sizer.size(&ArbRoute::new("A", "B"), &grid, dec!(1)).unwrap();

        assert_eq!(trades.len(), 4);
        for pair in trades.windows(2) {
            assert!(pair[0].profit < pair[1].profit);
        }
        // 10000 * 500 / 10500 - 1
        assert!(trades[0].profit > dec!(475.19));
        assert!(trades[0].profit < dec!(475.20));
    }

    #[test]
    fn test_empty_grid_yields_no_records() {
        let (pool, oracle) = two_token_setup(dec!(10000));
        let pricing = FixedRate(dec!(1));
        let sizer = TradeSizer::new(&pool, &pricing, &oracle);
        let grid = LiquidityGrid::new(dec!(10), dec!(10), dec!(1)).unwrap();

        assert!(sizer.size(&ArbRoute::new("A", "B"), &grid, dec!(1)).unwrap().is_empty());
    }

    #[test]
    fn test_pricing_errors_propagate() {
        let (pool, oracle) = two_token_setup(dec!(10000));
        let sizer = TradeSizer::new(&pool, &Broken, &oracle);
        let grid = LiquidityGrid::new(dec!(1), dec!(2), dec!(1)).unwrap();

        let result = sizer.size(&ArbRoute::new("A", "B"), &grid, dec!(1));
        assert_eq!(result, Err(ArbError::Math("broken curve".to_string())));
    }

    #[test]
    fn test_unknown_pool_token() {
        let (pool, oracle) = two_token_setup(dec!(10000));
        let pricing = FixedRate(dec!(1));
        let sizer = TradeSizer::new(&pool, &pricing, &oracle);
        let grid = LiquidityGrid::new(dec!(1), dec!(2), dec!(1)).unwrap();

        let result = sizer.size(&ArbRoute::new("A", "Z"), &grid, dec!(1));
        assert_eq!(result, Err(ArbError::UnknownToken("Z".to_string())));
    }
}
