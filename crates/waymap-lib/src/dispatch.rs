//! Route request dispatch.
//!
//! [`RouteRequestDispatcher::request_routes`] issues exactly one request per
//! call and hands back either the full replacement path set or the failure.
//! Callers are expected to have a complete selection before calling; the
//! dispatcher forwards the numbers it is given without clamping them.

use tracing::{error, info};

use crate::client::{PathQuery, RoutingBackend, SearchStrategy};
use crate::error::Result;
use crate::model::{Marker, Path, Way};

/// Issues route and road-network requests against a [`RoutingBackend`].
#[derive(Debug, Clone)]
pub struct RouteRequestDispatcher<B> {
    backend: B,
}

impl<B: RoutingBackend> RouteRequestDispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Request up to `amount` candidate routes from `start` to `goal`.
    pub fn request_routes(
        &self,
        start: Marker,
        goal: Marker,
        target_distance: f64,
        amount: u32,
        strategy: SearchStrategy,
    ) -> Result<Vec<Path>> {
        let query = PathQuery::new(start, goal, target_distance, amount);
        self.request_query(strategy, &query)
    }

    /// Same as [`request_routes`](Self::request_routes) with a prepared query.
    pub fn request_query(&self, strategy: SearchStrategy, query: &PathQuery) -> Result<Vec<Path>> {
        info!(
            strategy = %strategy,
            start = %query.start(),
            goal = %query.goal(),
            target_distance = query.target_distance,
            amount = query.amount,
            "requesting routes"
        );

        match self.backend.fetch_paths(strategy, query) {
            Ok(paths) => {
                info!(strategy = %strategy, paths = paths.len(), "routes received");
                Ok(paths)
            }
            Err(e) => {
                error!(strategy = %strategy, error = %e, "route request failed");
                Err(e)
            }
        }
    }

    /// Load the road network for the given highway tags.
    pub fn request_ways(&self, tags: &[String]) -> Result<Vec<Way>> {
        info!(tags = tags.len(), "requesting ways");
        match self.backend.fetch_ways(tags) {
            Ok(ways) => {
                let nodes: usize = ways.iter().map(|way| way.nodes.len()).sum();
                info!(ways = ways.len(), nodes, "ways received");
                Ok(ways)
            }
            Err(e) => {
                error!(error = %e, "loading ways failed");
                Err(e)
            }
        }
    }
}
