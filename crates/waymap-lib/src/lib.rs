//! waymap library entry points.
//!
//! This crate holds the client-side map-state engine for route exploration:
//! it projects ways, nodes and candidate paths into GeoJSON layers, assigns
//! stable colors, culls layers to the viewport, tracks the start/goal
//! selection, and dispatches route requests to the remote routing service.
//! Shells (the CLI, a GUI, a WASM front-end) drive a [`MapCoordinator`] and
//! should not reimplement any of this behavior.
//!

#![deny(warnings)]

pub mod client;
pub mod cluster;
pub mod color;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod memo;
pub mod model;
pub mod selection;
pub mod surface;
pub mod testing;
pub mod viewport;

pub use client::{HttpBackend, PathQuery, RoutingBackend, SearchStrategy};
pub use cluster::cluster_points;
pub use color::{assign_colors, Color, ColorAssignment};
pub use config::{
    default_road_tags, ClientConfig, CoordinatorConfig, RouteSettings, ACCEPTED_ROAD_TYPES,
};
pub use coordinator::{
    LayerToggles, MapCoordinator, PendingRoute, RecomputeCounts, RequestTicket, RouteOutcome,
};
pub use dispatch::RouteRequestDispatcher;
pub use error::{Error, Result};
pub use geometry::{feature_id, project_lines, project_nodes};
pub use memo::Memo;
pub use model::{LatLon, Marker, Node, Path, Polyline, Way};
pub use selection::{MarkerRole, Selection, SelectionState};
pub use surface::{HoverPopup, MapEvent, MapSurface, MarkerView, Notice, RenderFrame};
pub use viewport::{LinearScan, ViewportBounds, ViewportFilter};
