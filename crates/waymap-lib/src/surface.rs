//! Contract between the engine and the map rendering surface.
//!
//! The surface is opaque: it reports pointer and viewport events, answers
//! viewport queries, and draws whatever [`RenderFrame`] it is handed.

use std::fmt;
use std::sync::Arc;

use geojson::FeatureCollection;
use serde::Serialize;
use serde_json::json;

use crate::model::{LatLon, Marker};
use crate::selection::MarkerRole;
use crate::viewport::ViewportBounds;

/// Discrete event emitted by the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Primary-button click at a map location.
    PrimaryClick(LatLon),
    /// Secondary-button click (context menu); cancels the last marker.
    SecondaryClick,
    /// Pointer moved; `feature_id` is the interactive path feature under it.
    PointerMove {
        at: LatLon,
        feature_id: Option<String>,
    },
    /// Pointer left the map.
    PointerLeave,
    /// Pan or zoom settled on new bounds.
    ViewportChanged(ViewportBounds),
}

/// The map widget the coordinator drives.
pub trait MapSurface {
    /// Bounds currently on screen, if the surface has laid out yet.
    fn viewport_bounds(&self) -> Option<ViewportBounds>;

    /// Next pending event, in emission order.
    fn next_event(&mut self) -> Option<MapEvent>;

    /// Draw a frame.
    fn present(&mut self, frame: &RenderFrame);
}

/// Hover popup contents for a path under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverPopup {
    pub at: LatLon,
    pub path_id: String,
    /// Meters.
    pub distance: f64,
}

impl fmt::Display for HoverPopup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path ID: {} | Distance: {} m", self.path_id, self.distance)
    }
}

/// Non-fatal message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Notice {
    /// A well-formed response carried zero routes.
    NoRoutesFound,
    /// A route was requested without both markers.
    SelectionIncomplete(String),
    /// The route request failed; prior routes are kept.
    RequestFailed(String),
    /// The road network could not be loaded.
    WaysUnavailable(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoRoutesFound => f.write_str("no routes found"),
            Notice::SelectionIncomplete(message)
            | Notice::RequestFailed(message)
            | Notice::WaysUnavailable(message) => f.write_str(message),
        }
    }
}

/// A placed marker as drawn on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerView {
    pub role: MarkerRole,
    pub at: Marker,
}

/// Everything the surface needs to draw one frame.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    /// Visible routes within the viewport.
    pub paths: Arc<FeatureCollection>,
    /// Way lines, `None` while the way overlay is off.
    pub ways: Option<Arc<FeatureCollection>>,
    /// Way nodes, `None` while the node overlay is off.
    pub nodes: Option<Arc<FeatureCollection>>,
    /// Whether `nodes` holds clusters rather than individual nodes.
    pub nodes_clustered: bool,
    pub markers: Vec<MarkerView>,
    pub popup: Option<HoverPopup>,
    pub notice: Option<Notice>,
}

impl RenderFrame {
    /// JSON document with one entry per layer.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "paths": self.paths.as_ref(),
            "ways": self.ways.as_deref(),
            "nodes": self.nodes.as_deref(),
            "nodes_clustered": self.nodes_clustered,
            "markers": self.markers,
            "popup": self.popup,
            "notice": self.notice,
        })
    }
}
