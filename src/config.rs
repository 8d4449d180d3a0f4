//! Configuration management
//!
//! Arbitrage parameters plus a TOML scenario format that bundles parameters,
//! pool state and prices for a single decision cycle.

use crate::error::{ArbError, ArbResult};
use crate::pool::{Pool, SwapPricing};
use crate::types::{ExternalPriceTable, MarketState, SpotPriceTable};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Which ranked routes the engine sizes each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSelection {
    /// Only the most mispriced route is sized
    #[default]
    TopRanked,
    /// Every ranked route is sized and the best trade across them wins
    AllRoutes,
}

/// Per-run arbitrage parameters, all amounts in external currency
#[derive(Debug, Clone, Deserialize)]
pub struct ArbParams {
    pub external_currency: String,
    pub min_arb_liquidity: Decimal,
    pub max_arb_liquidity: Decimal,
    pub arb_liquidity_granularity: Decimal,
    #[serde(default)]
    pub route_selection: RouteSelection,
}

impl ArbParams {
    pub fn new(
        external_currency: impl Into<String>,
        min_arb_liquidity: Decimal,
        max_arb_liquidity: Decimal,
        arb_liquidity_granularity: Decimal,
    ) -> Self {
        Self {
            external_currency: external_currency.into(),
            min_arb_liquidity,
            max_arb_liquidity,
            arb_liquidity_granularity,
            route_selection: RouteSelection::default(),
        }
    }

    pub fn with_route_selection(mut self, route_selection: RouteSelection) -> Self {
        self.route_selection = route_selection;
        self
    }

    /// A non-positive step would never reach the upper bound.
    /// `min >= max` is allowed and yields an empty grid.
    pub fn validate(&self) -> ArbResult<()> {
        if self.arb_liquidity_granularity <= Decimal::ZERO {
            return Err(ArbError::InvalidParams(format!(
                "arb_liquidity_granularity must be positive, got {}",
                self.arb_liquidity_granularity
            )));
        }
        Ok(())
    }
}

/// Top-level TOML scenario
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    pub params: ArbParams,
    pub state: StateConfig,
    pub pool: Pool,
}

/// Per-cycle state section
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    pub gas_cost: Decimal,
    pub change_datetime: DateTime<Utc>,
    #[serde(default)]
    pub timestep: u64,
    /// Derived from the pool when omitted
    pub spot_prices: Option<SpotPriceTable>,
    pub token_prices: ExternalPriceTable,
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read scenario file: {}", path.as_ref().display()))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).with_context(|| "Failed to parse TOML scenario")?;
        config.params.validate()?;
        Ok(config)
    }

    /// Build the cycle's market state, deriving spot prices if none were given
    pub fn market_state<P: SwapPricing>(&self, pricing: &P) -> ArbResult<MarketState> {
        let spot_prices = match &self.state.spot_prices {
            Some(table) => table.clone(),
            None => self.pool.spot_prices(pricing)?,
        };

        Ok(MarketState {
            pool: self.pool.clone(),
            spot_prices,
            token_prices: self.state.token_prices.clone(),
            gas_cost: self.state.gas_cost,
            change_datetime: self.state.change_datetime,
            timestep: self.state.timestep,
        })
    }
}
