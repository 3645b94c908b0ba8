//! Route command handler.
//!
//! Places the start and goal markers the same way a click on the map would,
//! sends one route request, and renders the resulting frame.

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use waymap_lib::{
    CoordinatorConfig, LatLon, MapCoordinator, MapEvent, RenderFrame, RouteOutcome,
    RouteRequestDispatcher, RouteSettings, RoutingBackend, ViewportBounds,
};

use crate::surface::BatchSurface;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub start: LatLon,
    pub goal: LatLon,
    pub settings: RouteSettings,
    /// Also load and render the road network with these tags.
    pub way_tags: Option<Vec<String>>,
    pub bounds: Option<ViewportBounds>,
    pub config: CoordinatorConfig,
}

pub fn run_route<B: RoutingBackend>(
    dispatcher: &RouteRequestDispatcher<B>,
    args: &RouteCommandArgs,
) -> Result<RenderFrame> {
    let mut coordinator = MapCoordinator::new(args.config.clone());
    coordinator.set_route_settings(args.settings);
    coordinator.set_ways_visible(args.way_tags.is_some());

    if let Some(tags) = &args.way_tags {
        coordinator
            .load_ways(dispatcher, tags)
            .context("failed to load the road network")?;
    }

    let mut surface = BatchSurface::new(args.bounds);
    surface.push(MapEvent::PrimaryClick(args.start));
    surface.push(MapEvent::PrimaryClick(args.goal));
    coordinator.pump(&mut surface);

    match coordinator.request_routes(dispatcher)? {
        RouteOutcome::Committed { paths } => info!(paths, "routes committed"),
        RouteOutcome::NoRoutes => warn!("the routing service found no routes"),
        RouteOutcome::Failed { reason } => bail!("could not fetch routes: {reason}"),
        RouteOutcome::Stale => bail!("route response was superseded"),
    }

    coordinator.pump(&mut surface);
    surface
        .into_frame()
        .context("surface did not receive a frame")
}
