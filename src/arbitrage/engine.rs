//! Arbitrage Decision Engine
//!
//! Runs one decision cycle against a market snapshot:
//! oracle -> route ranking -> grid sizing -> viability filter -> decision.
//!
//! Terminal outcomes are a swap instruction or the all-null no-trade record.
//! Malformed price tables and pricing failures are errors and abort the cycle.

use super::oracle::PriceOracle;
use super::route_finder::RouteFinder;
use super::trade_sizer::{LiquidityGrid, TradeSizer};
use crate::config::{ArbParams, RouteSelection};
use crate::error::{ArbError, ArbResult};
use crate::pool::calculator::checked_mul;
use crate::pool::{Pool, SwapPricing, WeightedMath, MAX_IN_RATIO};
use crate::types::{
    ArbDecision, MarketState, PotentialArbTrade, SwapExactAmountInInput, SwapExactAmountInOutput,
    TokenAmount,
};
use chrono::Duration;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Delay applied to emitted swaps, roughly one block
pub const EXECUTION_DELAY_SECS: i64 = 15;

/// Stateless decision engine; the same snapshot always yields the same decision
pub struct ArbitrageEngine<P: SwapPricing = WeightedMath> {
    params: ArbParams,
    grid: LiquidityGrid,
    pricing: P,
}

impl ArbitrageEngine<WeightedMath> {
    /// Engine sizing trades against the constant-weighted-product curve
    pub fn new(params: ArbParams) -> ArbResult<Self> {
        Self::with_pricing(params, WeightedMath::new())
    }
}

impl<P: SwapPricing> ArbitrageEngine<P> {
    /// Engine with an injected pricing curve
    pub fn with_pricing(params: ArbParams, pricing: P) -> ArbResult<Self> {
        params.validate()?;
        let grid = LiquidityGrid::from_params(&params)?;
        Ok(Self {
            params,
            grid,
            pricing,
        })
    }

    pub fn params(&self) -> &ArbParams {
        &self.params
    }

    /// Decide whether and how to trade in this cycle
    pub fn decide(&self, state: &MarketState) -> ArbResult<ArbDecision> {
        debug!("Timestep {}: evaluating pool with {} tokens", state.timestep, state.pool.token_count());

        let oracle = PriceOracle::new(
            state.pool.token_count(),
            state.spot_prices.clone(),
            self.params.external_currency.clone(),
            state.token_prices.clone(),
        )?;
        if let Some(missing) = state.pool.symbols().find(|t| !oracle.contains(t)) {
            return Err(ArbError::UnknownToken(missing.to_string()));
        }

        let routes = RouteFinder::new(&oracle).find_routes(state.pool.symbols())?;
        if routes.is_empty() {
            info!("Timestep {}: no trade, no mispriced route", state.timestep);
            return Ok(ArbDecision::no_trade());
        }

        let selected = match self.params.route_selection {
            RouteSelection::TopRanked => &routes[..1],
            RouteSelection::AllRoutes => &routes[..],
        };

        let sizer = TradeSizer::new(&state.pool, &self.pricing, &oracle);
        let mut trades = Vec::new();
        for ranked in selected {
            debug!("Sizing {} (score {})", ranked.route, ranked.score);
            trades.extend(sizer.size(&ranked.route, &self.grid, state.gas_cost)?);
        }

        if trades.is_empty() {
            info!("Timestep {}: no trade, empty liquidity grid", state.timestep);
            return Ok(ArbDecision::no_trade());
        }

        // Stable: equal profits keep grid order, so the smaller notional wins
        trades.sort_by(|a, b| b.profit.cmp(&a.profit));

        let mut best = None;
        for trade in trades {
            if is_viable(&trade, &state.pool)? {
                best = Some(trade);
                break;
            }
        }

        let Some(trade) = best else {
            info!("Timestep {}: no trade, nothing covers cost within pool limits", state.timestep);
            return Ok(ArbDecision::no_trade());
        };

        info!(
            "Timestep {}: most profitable trade {} {}",
            state.timestep, trade, self.params.external_currency
        );

        let scheduled_at = state
            .change_datetime
            .checked_add_signed(Duration::seconds(EXECUTION_DELAY_SECS))
            .ok_or_else(|| {
                ArbError::Math(format!("cannot schedule swap after {}", state.change_datetime))
            })?;

        let swap_input = SwapExactAmountInInput {
            token_in: TokenAmount::new(trade.token_in.clone(), trade.token_amount_in),
            min_token_out: TokenAmount::new(trade.token_out.clone(), Decimal::ZERO),
        };
        let swap_output = SwapExactAmountInOutput {
            token_out: TokenAmount::new(trade.token_out, trade.token_amount_out),
        };

        Ok(ArbDecision::swap((swap_input, swap_output), scheduled_at))
    }
}

/// Profit must strictly exceed the cost, and the input must stay under the
/// pool's per-swap cap
fn is_viable(trade: &PotentialArbTrade, pool: &Pool) -> ArbResult<bool> {
    if trade.profit <= trade.transaction_cost {
        return Ok(false);
    }
    let balance_in = pool.token(&trade.token_in)?.balance;
    let cap = checked_mul(balance_in, MAX_IN_RATIO, "max in ratio")?;
    Ok(trade.token_amount_in < cap)
}
