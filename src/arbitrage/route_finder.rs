//! Route Finder
//!
//! Ranks every (token_in, token_out) direction through the pool by how far
//! the pool undervalues token_in relative to the external market.
//!
//! For token x and counter-token y:
//!   pool-implied value of x via y = (y per 1 x in the pool) * external price of y
//! If x's own external price is strictly below that value, selling x into the
//! pool for y gains value. Score = external(x) / implied(x -> y), lower is better.

use super::oracle::PriceOracle;
use crate::error::ArbResult;
use crate::types::{ArbRoute, RankedRoute};
use tracing::debug;

/// Mispricing search over all token pairs
pub struct RouteFinder<'a> {
    oracle: &'a PriceOracle,
}

impl<'a> RouteFinder<'a> {
    pub fn new(oracle: &'a PriceOracle) -> Self {
        Self { oracle }
    }

    /// All mispriced directions, most attractive first.
    ///
    /// Ties keep discovery order (tokens in the order given, counter-tokens in
    /// oracle order). An empty result means there is nothing to trade.
    pub fn find_routes<'t, I>(&self, tokens: I) -> ArbResult<Vec<RankedRoute>>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut routes = Vec::new();

        for token_in in tokens {
            let external = self.oracle.external_price(token_in)?;

            for counter in self.oracle.lookup(token_in)? {
                let counter_price = self.oracle.external_price(&counter.symbol)?;
                let implied = counter.convert(&counter_price)?;

                debug!(
                    "1 {} is ~{} externally, comes out of the pool as {} (~{})",
                    token_in, external, counter, implied
                );

                if external.amount < implied.amount {
                    let score = external.ratio(&implied)?;
                    routes.push(RankedRoute {
                        route: ArbRoute::new(token_in, counter.symbol.clone()),
                        score,
                    });
                }
            }
        }

        routes.sort_by(|a, b| a.score.cmp(&b.score));

        debug!("Found {} mispriced routes", routes.len());
        Ok(routes)
    }
}
