//! Map interaction coordinator.
//!
//! [`MapCoordinator`] owns every piece of mutable session state (ways, paths,
//! selection, overlay toggles, visible path ids, viewport, hover and notices)
//! and turns surface events into state changes. Rendering derives colors,
//! geometry and viewport subsets through [`Memo`] slots keyed on collection
//! generations, so hover and toggle changes never re-project the road network.
//!
//! # Route requests
//!
//! A request is split in two so the network call can run off the event loop:
//!
//! 1. [`MapCoordinator::begin_route_request`] validates the selection and hands
//!    out a [`PendingRoute`] carrying a sequence ticket.
//! 2. [`MapCoordinator::complete_route_request`] applies the outcome, unless a
//!    later ticket has already settled (successfully or not), in which case
//!    the late response is discarded as stale.
//!
//! [`MapCoordinator::request_routes`] chains both for synchronous callers.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use geojson::FeatureCollection;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::{PathQuery, RoutingBackend, SearchStrategy};
use crate::cluster::cluster_points;
use crate::color::{assign_colors, ColorAssignment};
use crate::config::{CoordinatorConfig, RouteSettings};
use crate::dispatch::RouteRequestDispatcher;
use crate::error::{Error, Result};
use crate::geometry::{feature_id, project_lines, project_nodes};
use crate::memo::Memo;
use crate::model::{LatLon, Path, Way};
use crate::selection::Selection;
use crate::surface::{HoverPopup, MapEvent, MapSurface, MarkerView, Notice, RenderFrame};
use crate::viewport::{LinearScan, ViewportBounds, ViewportFilter};

/// Overlay visibility switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerToggles {
    pub nodes: bool,
    pub ways: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            nodes: false,
            ways: true,
        }
    }
}

/// Sequence number of an issued route request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// A validated route request waiting to be sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingRoute {
    pub ticket: RequestTicket,
    pub strategy: SearchStrategy,
    pub query: PathQuery,
}

/// What happened to a completed route request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The response replaced the path set.
    Committed { paths: usize },
    /// The response was well-formed but held no routes; the path set is now empty.
    NoRoutes,
    /// The request failed; prior paths are untouched.
    Failed { reason: String },
    /// A newer request had already settled; this response was dropped.
    Stale,
}

/// How many times each derived layer has been rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecomputeCounts {
    pub way_colors: u64,
    pub path_colors: u64,
    pub way_lines: u64,
    pub way_nodes: u64,
    pub path_lines: u64,
    pub visible_ways: u64,
    pub visible_nodes: u64,
    pub visible_paths: u64,
}

type Bounds = Option<ViewportBounds>;

#[derive(Debug, Default)]
struct RenderCache {
    way_colors: Memo<u64, ColorAssignment>,
    path_colors: Memo<u64, ColorAssignment>,
    way_lines: Memo<(u64, u64), FeatureCollection>,
    way_nodes: Memo<(u64, u64), FeatureCollection>,
    path_lines: Memo<(u64, u64), FeatureCollection>,
    visible_ways: Memo<(u64, Bounds), FeatureCollection>,
    visible_nodes: Memo<(u64, Bounds), (Arc<FeatureCollection>, bool)>,
    visible_paths: Memo<(u64, u64, Bounds), FeatureCollection>,
}

/// Ticket bookkeeping for route requests.
///
/// `settled` is the newest ticket whose response has been applied, whether it
/// succeeded or failed. A failed newer request still settles its ticket, so a
/// successful older response arriving afterwards is discarded as stale and the
/// failure notice stays up.
#[derive(Debug, Default, Clone, Copy)]
struct RequestSequence {
    issued: u64,
    settled: u64,
}

/// Owner of all interactive map state for one session.
pub struct MapCoordinator {
    config: CoordinatorConfig,
    filter: Box<dyn ViewportFilter + Send + Sync>,
    ways: Arc<Vec<Way>>,
    ways_generation: u64,
    ways_loaded: bool,
    paths: Arc<Vec<Path>>,
    paths_generation: u64,
    selection: Selection,
    toggles: LayerToggles,
    visible_paths: BTreeSet<String>,
    visible_generation: u64,
    viewport: Option<ViewportBounds>,
    hover: Option<HoverPopup>,
    notice: Option<Notice>,
    settings: RouteSettings,
    sequence: RequestSequence,
    cache: RenderCache,
}

impl Default for MapCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl MapCoordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_filter(config, LinearScan)
    }

    /// Use a custom viewport filter (for example a spatially indexed one).
    pub fn with_filter<F>(config: CoordinatorConfig, filter: F) -> Self
    where
        F: ViewportFilter + Send + Sync + 'static,
    {
        Self {
            config,
            filter: Box::new(filter),
            ways: Arc::new(Vec::new()),
            ways_generation: 0,
            ways_loaded: false,
            paths: Arc::new(Vec::new()),
            paths_generation: 0,
            selection: Selection::new(),
            toggles: LayerToggles::default(),
            visible_paths: BTreeSet::new(),
            visible_generation: 0,
            viewport: None,
            hover: None,
            notice: None,
            settings: RouteSettings::default(),
            sequence: RequestSequence::default(),
            cache: RenderCache::default(),
        }
    }

    // ---------------------------------------------------------------------
    // Read access for the shell
    // ---------------------------------------------------------------------

    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn toggles(&self) -> LayerToggles {
        self.toggles
    }

    pub fn visible_paths(&self) -> &BTreeSet<String> {
        &self.visible_paths
    }

    pub fn viewport(&self) -> Option<ViewportBounds> {
        self.viewport
    }

    pub fn hover(&self) -> Option<&HoverPopup> {
        self.hover.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn route_settings(&self) -> RouteSettings {
        self.settings
    }

    pub fn recompute_counts(&self) -> RecomputeCounts {
        RecomputeCounts {
            way_colors: self.cache.way_colors.computations(),
            path_colors: self.cache.path_colors.computations(),
            way_lines: self.cache.way_lines.computations(),
            way_nodes: self.cache.way_nodes.computations(),
            path_lines: self.cache.path_lines.computations(),
            visible_ways: self.cache.visible_ways.computations(),
            visible_nodes: self.cache.visible_nodes.computations(),
            visible_paths: self.cache.visible_paths.computations(),
        }
    }

    // ---------------------------------------------------------------------
    // Mutators for the shell
    // ---------------------------------------------------------------------

    pub fn set_nodes_visible(&mut self, visible: bool) {
        self.toggles.nodes = visible;
    }

    pub fn set_ways_visible(&mut self, visible: bool) {
        self.toggles.ways = visible;
    }

    pub fn set_route_settings(&mut self, settings: RouteSettings) {
        self.settings = settings;
    }

    pub fn set_strategy(&mut self, strategy: SearchStrategy) {
        self.settings.strategy = strategy;
    }

    /// Add `id` to the visible path set. Returns whether it was newly added.
    pub fn show_path(&mut self, id: impl Into<String>) -> bool {
        let added = self.visible_paths.insert(id.into());
        if added {
            self.visible_generation += 1;
        }
        added
    }

    /// Remove `id` from the visible path set. Returns whether it was present.
    pub fn hide_path(&mut self, id: &str) -> bool {
        let removed = self.visible_paths.remove(id);
        if removed {
            self.visible_generation += 1;
            if self.hover.as_ref().is_some_and(|popup| popup.path_id == id) {
                self.hover = None;
            }
        }
        removed
    }

    pub fn set_visible_paths<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible_paths = ids.into_iter().map(Into::into).collect();
        self.visible_generation += 1;
        self.refresh_hover();
    }

    /// Whether the road network has been received.
    pub fn ways_loaded(&self) -> bool {
        self.ways_loaded
    }

    fn set_ways(&mut self, ways: Vec<Way>) {
        self.ways = Arc::new(ways);
        self.ways_generation += 1;
        self.ways_loaded = true;
        debug!(
            ways = self.ways.len(),
            generation = self.ways_generation,
            "ways replaced"
        );
    }

    /// Replace the path set wholesale.
    ///
    /// Visible ids that are not part of the new set are dropped; with
    /// `reveal_new_paths` every new path becomes visible.
    pub fn set_paths(&mut self, paths: Vec<Path>) {
        let ids: HashSet<&str> = paths.iter().map(|path| path.id.as_str()).collect();
        self.visible_paths.retain(|id| ids.contains(id.as_str()));
        if self.config.reveal_new_paths {
            self.visible_paths
                .extend(paths.iter().map(|path| path.id.clone()));
        }
        self.visible_generation += 1;

        self.paths = Arc::new(paths);
        self.paths_generation += 1;
        self.refresh_hover();
        debug!(
            paths = self.paths.len(),
            visible = self.visible_paths.len(),
            generation = self.paths_generation,
            "paths replaced"
        );
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Apply one surface event. Returns whether any state changed.
    pub fn handle_event(&mut self, event: MapEvent) -> bool {
        match event {
            MapEvent::PrimaryClick(at) => {
                let placed = self.selection.primary(at);
                if placed && self.selection.is_full() {
                    if let Some(Notice::SelectionIncomplete(_)) = self.notice {
                        self.notice = None;
                    }
                }
                placed
            }
            MapEvent::SecondaryClick => self.selection.secondary().is_some(),
            MapEvent::PointerMove { at, feature_id } => {
                let popup = feature_id.and_then(|id| self.popup_for(&id, at));
                let changed = popup != self.hover;
                self.hover = popup;
                changed
            }
            MapEvent::PointerLeave => self.hover.take().is_some(),
            MapEvent::ViewportChanged(bounds) => {
                let changed = self.viewport != Some(bounds);
                self.viewport = Some(bounds);
                changed
            }
        }
    }

    /// Drain pending surface events, then present a fresh frame.
    ///
    /// Returns the number of events handled.
    pub fn pump<S: MapSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        if self.viewport.is_none() {
            self.viewport = surface.viewport_bounds();
        }

        let mut handled = 0;
        while let Some(event) = surface.next_event() {
            self.handle_event(event);
            handled += 1;
        }

        let frame = self.render();
        surface.present(&frame);
        handled
    }

    fn popup_for(&self, id: &str, at: LatLon) -> Option<HoverPopup> {
        if !self.visible_paths.contains(id) {
            return None;
        }
        self.paths
            .iter()
            .find(|path| path.id == id)
            .map(|path| HoverPopup {
                at,
                path_id: path.id.clone(),
                distance: path.distance,
            })
    }

    fn refresh_hover(&mut self) {
        if let Some(popup) = self.hover.take() {
            self.hover = self.popup_for(&popup.path_id, popup.at);
        }
    }

    // ---------------------------------------------------------------------
    // Route requests
    // ---------------------------------------------------------------------

    /// Validate the selection and issue a ticket for a new route request.
    pub fn begin_route_request(&mut self) -> Result<PendingRoute> {
        let Some((start, goal)) = self.selection.endpoints() else {
            let error = Error::IncompleteSelection {
                markers: self.selection.len(),
            };
            warn!(markers = self.selection.len(), "route requested without start and goal");
            self.notice = Some(Notice::SelectionIncomplete(error.to_string()));
            return Err(error);
        };

        self.sequence.issued += 1;
        let ticket = RequestTicket(self.sequence.issued);
        let settings = self.settings;
        debug!(
            ticket = ticket.sequence(),
            strategy = %settings.strategy,
            "route request issued"
        );

        Ok(PendingRoute {
            ticket,
            strategy: settings.strategy,
            query: PathQuery::new(start, goal, settings.target_distance, settings.amount),
        })
    }

    /// Commit the outcome of a request issued by [`begin_route_request`](Self::begin_route_request).
    pub fn complete_route_request(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<Vec<Path>>,
    ) -> RouteOutcome {
        if ticket.sequence() <= self.sequence.settled {
            debug!(
                ticket = ticket.sequence(),
                settled = self.sequence.settled,
                "discarding stale route response"
            );
            return RouteOutcome::Stale;
        }
        self.sequence.settled = ticket.sequence();

        match outcome {
            Ok(paths) => {
                let count = paths.len();
                self.set_paths(paths);
                if count == 0 {
                    info!(ticket = ticket.sequence(), "no routes found");
                    self.notice = Some(Notice::NoRoutesFound);
                    RouteOutcome::NoRoutes
                } else {
                    self.notice = None;
                    RouteOutcome::Committed { paths: count }
                }
            }
            Err(e) => {
                warn!(ticket = ticket.sequence(), error = %e, "route request failed, keeping previous paths");
                let reason = e.to_string();
                self.notice = Some(Notice::RequestFailed(format!(
                    "could not fetch routes: {reason}"
                )));
                RouteOutcome::Failed { reason }
            }
        }
    }

    /// Run a route request to completion on the calling thread.
    ///
    /// Only an incomplete selection is returned as an error; transport
    /// failures resolve to [`RouteOutcome::Failed`].
    pub fn request_routes<B: RoutingBackend>(
        &mut self,
        dispatcher: &RouteRequestDispatcher<B>,
    ) -> Result<RouteOutcome> {
        let pending = self.begin_route_request()?;
        let outcome = dispatcher.request_query(pending.strategy, &pending.query);
        Ok(self.complete_route_request(pending.ticket, outcome))
    }

    /// Load the road network for `tags`.
    ///
    /// The network is fetched once per session: after a successful load this
    /// returns the current way count without contacting the service. On
    /// failure the current ways stay in place, a notice is raised and a later
    /// call retries.
    pub fn load_ways<B: RoutingBackend>(
        &mut self,
        dispatcher: &RouteRequestDispatcher<B>,
        tags: &[String],
    ) -> Result<usize> {
        if self.ways_loaded {
            debug!(ways = self.ways.len(), "road network already loaded");
            return Ok(self.ways.len());
        }
        match dispatcher.request_ways(tags) {
            Ok(ways) => {
                let count = ways.len();
                self.set_ways(ways);
                if let Some(Notice::WaysUnavailable(_)) = self.notice {
                    self.notice = None;
                }
                Ok(count)
            }
            Err(e) => {
                self.notice = Some(Notice::WaysUnavailable(format!(
                    "could not load the road network: {e}"
                )));
                Err(e)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    /// Colors for the current ways.
    pub fn way_colors(&mut self) -> Arc<ColorAssignment> {
        let ways = Arc::clone(&self.ways);
        self.cache
            .way_colors
            .get_or_compute(self.ways_generation, || assign_colors(&ways))
    }

    /// Colors for the current paths.
    pub fn path_colors(&mut self) -> Arc<ColorAssignment> {
        let paths = Arc::clone(&self.paths);
        self.cache
            .path_colors
            .get_or_compute(self.paths_generation, || assign_colors(&paths))
    }

    fn way_lines(&mut self) -> Arc<FeatureCollection> {
        let colors = self.way_colors();
        let key = (self.ways_generation, self.cache.way_colors.computations());
        let ways = Arc::clone(&self.ways);
        self.cache
            .way_lines
            .get_or_compute(key, || project_lines(&ways, &colors))
    }

    fn way_nodes(&mut self) -> Arc<FeatureCollection> {
        let colors = self.way_colors();
        let key = (self.ways_generation, self.cache.way_colors.computations());
        let ways = Arc::clone(&self.ways);
        self.cache
            .way_nodes
            .get_or_compute(key, || project_nodes(&ways, &colors))
    }

    fn path_lines(&mut self) -> Arc<FeatureCollection> {
        let colors = self.path_colors();
        let key = (self.paths_generation, self.cache.path_colors.computations());
        let paths = Arc::clone(&self.paths);
        self.cache
            .path_lines
            .get_or_compute(key, || project_lines(&paths, &colors))
    }

    fn visible_way_lines(&mut self) -> Arc<FeatureCollection> {
        let lines = self.way_lines();
        let Some(bounds) = self.viewport else {
            return lines;
        };
        let key = (self.cache.way_lines.computations(), Some(bounds));
        let filter = &self.filter;
        self.cache
            .visible_ways
            .get_or_compute(key, || filter.filter(&lines, &bounds))
    }

    fn visible_way_nodes(&mut self) -> (Arc<FeatureCollection>, bool) {
        let nodes = self.way_nodes();
        let Some(bounds) = self.viewport else {
            return (nodes, false);
        };
        let key = (self.cache.way_nodes.computations(), Some(bounds));
        let filter = &self.filter;
        let threshold = self.config.node_cluster_threshold;
        let grid = self.config.cluster_grid;
        let layer = self.cache.visible_nodes.get_or_compute(key, || {
            let visible = filter.filter(&nodes, &bounds);
            if visible.features.len() > threshold {
                (Arc::new(cluster_points(&visible, &bounds, grid)), true)
            } else {
                (Arc::new(visible), false)
            }
        });
        (Arc::clone(&layer.0), layer.1)
    }

    fn visible_path_lines(&mut self) -> Arc<FeatureCollection> {
        let lines = self.path_lines();
        let key = (
            self.cache.path_lines.computations(),
            self.visible_generation,
            self.viewport,
        );
        let visible_ids = &self.visible_paths;
        let bounds = self.viewport;
        let filter = &self.filter;
        self.cache.visible_paths.get_or_compute(key, || {
            let selected = FeatureCollection {
                bbox: None,
                features: lines
                    .features
                    .iter()
                    .filter(|feature| feature_id(feature).is_some_and(|id| visible_ids.contains(id)))
                    .cloned()
                    .collect(),
                foreign_members: None,
            };
            match bounds {
                Some(bounds) => filter.filter(&selected, &bounds),
                None => selected,
            }
        })
    }

    /// Compose the frame for the current state.
    ///
    /// Layers switched off are skipped entirely; their cached geometry stays
    /// valid for when they are switched back on.
    pub fn render(&mut self) -> RenderFrame {
        let paths = self.visible_path_lines();
        let ways = self.toggles.ways.then(|| self.visible_way_lines());
        let (nodes, nodes_clustered) = if self.toggles.nodes {
            let (layer, clustered) = self.visible_way_nodes();
            (Some(layer), clustered)
        } else {
            (None, false)
        };

        let markers = self
            .selection
            .with_roles()
            .map(|(role, at)| MarkerView { role, at })
            .collect();

        RenderFrame {
            paths,
            ways,
            nodes,
            nodes_clustered,
            markers,
            popup: self.hover.clone(),
            notice: self.notice.clone(),
        }
    }
}
