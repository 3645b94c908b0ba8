//! Ways command handler: loads the road network and renders its layers.

use anyhow::{Context, Result};
use tracing::info;

use waymap_lib::{
    CoordinatorConfig, MapCoordinator, RenderFrame, RouteRequestDispatcher, RoutingBackend,
    ViewportBounds,
};

use crate::surface::BatchSurface;

/// Arguments for the ways command.
#[derive(Debug, Clone)]
pub struct WaysCommandArgs {
    /// Highway tags to request.
    pub tags: Vec<String>,
    /// Include the node overlay.
    pub nodes: bool,
    /// Cull layers to these bounds.
    pub bounds: Option<ViewportBounds>,
    pub config: CoordinatorConfig,
}

pub fn run_ways<B: RoutingBackend>(
    dispatcher: &RouteRequestDispatcher<B>,
    args: &WaysCommandArgs,
) -> Result<RenderFrame> {
    let mut coordinator = MapCoordinator::new(args.config.clone());
    coordinator.set_nodes_visible(args.nodes);

    let count = coordinator
        .load_ways(dispatcher, &args.tags)
        .context("failed to load the road network")?;
    info!(ways = count, "road network loaded");

    let mut surface = BatchSurface::new(args.bounds);
    coordinator.pump(&mut surface);
    surface
        .into_frame()
        .context("surface did not receive a frame")
}
