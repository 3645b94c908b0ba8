//! Viewport culling for point and line feature collections.
//!
//! A point is kept when its coordinate lies inside the bounds. A line is kept
//! when at least one of its vertices lies inside; segments that merely cross
//! the viewport without a vertex in it are dropped. Bounds are inclusive on
//! every edge.

use geojson::{Feature, FeatureCollection, Value};
use serde::Serialize;

use crate::error::{Error, Result};

/// Rectangular geographic extent of the rendered map.
///
/// Only constructible through [`ViewportBounds::new`], so every value is
/// finite and non-inverted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportBounds {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl ViewportBounds {
    /// Build bounds, rejecting inverted or non-finite extents.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Result<Self> {
        let values = [min_lat, max_lat, min_lon, max_lon];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig {
                message: "viewport bounds must be finite".to_string(),
            });
        }
        if min_lat > max_lat || min_lon > max_lon {
            return Err(Error::InvalidConfig {
                message: format!(
                    "viewport bounds are inverted (lat {min_lat}..{max_lat}, lon {min_lon}..{max_lon})"
                ),
            });
        }
        Ok(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Contains a GeoJSON position (`[lon, lat, ..]`).
    pub fn contains_position(&self, position: &[f64]) -> bool {
        match position {
            [lon, lat, ..] => self.contains(*lat, *lon),
            _ => false,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}

/// Restricts a feature collection to what is visible in a viewport.
///
/// Implementations must be stateless between calls: the same collection and
/// bounds always give the same answer, so an indexed implementation can
/// replace the linear scan without callers noticing.
pub trait ViewportFilter {
    fn filter(&self, features: &FeatureCollection, bounds: &ViewportBounds) -> FeatureCollection;
}

/// Linear scan over every feature; adequate for a city-sized road graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScan;

impl ViewportFilter for LinearScan {
    fn filter(&self, features: &FeatureCollection, bounds: &ViewportBounds) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: features
                .features
                .iter()
                .filter(|feature| is_visible(feature, bounds))
                .cloned()
                .collect(),
            foreign_members: features.foreign_members.clone(),
        }
    }
}

/// Whether a feature's representative coordinate lies inside `bounds`.
pub fn is_visible(feature: &Feature, bounds: &ViewportBounds) -> bool {
    let Some(geometry) = &feature.geometry else {
        return false;
    };
    match &geometry.value {
        Value::Point(position) => bounds.contains_position(position),
        Value::MultiPoint(positions) | Value::LineString(positions) => positions
            .iter()
            .any(|position| bounds.contains_position(position)),
        Value::MultiLineString(lines) => lines
            .iter()
            .flatten()
            .any(|position| bounds.contains_position(position)),
        Value::Polygon(_) | Value::MultiPolygon(_) | Value::GeometryCollection(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::assign_colors;
    use crate::geometry::{feature_id, project_lines, project_nodes};
    use crate::model::{Node, Way};

    fn bounds() -> ViewportBounds {
        ViewportBounds::new(51.0, 51.1, 4.0, 4.1).unwrap()
    }

    fn ways() -> Vec<Way> {
        vec![
            Way::new("inside", vec![Node::new("a", 51.05, 4.05)]),
            Way::new(
                "crossing",
                vec![Node::new("b", 50.9, 4.05), Node::new("c", 51.05, 4.05)],
            ),
            Way::new("outside", vec![Node::new("d", 52.0, 5.0)]),
            Way::new("edge", vec![Node::new("e", 51.1, 4.0)]),
        ]
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert!(ViewportBounds::new(52.0, 51.0, 4.0, 4.1).is_err());
        assert!(ViewportBounds::new(51.0, 51.1, 4.1, 4.0).is_err());
        assert!(ViewportBounds::new(f64::NAN, 51.0, 4.0, 4.1).is_err());
        assert!(ViewportBounds::new(51.0, f64::INFINITY, 4.0, 4.1).is_err());
    }

    #[test]
    fn accessors_report_validated_edges() {
        let b = ViewportBounds::new(51.0, 51.1, 4.0, 4.2).unwrap();
        assert_eq!((b.min_lat(), b.max_lat()), (51.0, 51.1));
        assert_eq!((b.min_lon(), b.max_lon()), (4.0, 4.2));
        assert!((b.lon_span() - 0.2).abs() < 1e-12);

        let json = serde_json::to_value(b).unwrap();
        assert_eq!(json["min_lat"], 51.0);
        assert_eq!(json["max_lon"], 4.2);
    }

    #[test]
    fn lines_with_a_vertex_inside_are_kept() {
        let ways = ways();
        let lines = project_lines(&ways, &assign_colors(&ways));
        let visible = LinearScan.filter(&lines, &bounds());
        let ids: Vec<_> = visible.features.iter().filter_map(feature_id).collect();
        assert_eq!(ids, vec!["inside", "crossing", "edge"]);
    }

    #[test]
    fn points_are_filtered_by_their_coordinate() {
        let ways = ways();
        let nodes = project_nodes(&ways, &assign_colors(&ways));
        let visible = LinearScan.filter(&nodes, &bounds());
        let ids: Vec<_> = visible.features.iter().filter_map(feature_id).collect();
        assert_eq!(ids, vec!["a", "c", "e"]);
    }

    #[test]
    fn result_is_subset_and_idempotent() {
        let ways = ways();
        let nodes = project_nodes(&ways, &assign_colors(&ways));
        let b = bounds();
        let once = LinearScan.filter(&nodes, &b);
        let twice = LinearScan.filter(&once, &b);

        assert_eq!(once, twice);
        for feature in &once.features {
            assert!(nodes.features.contains(feature));
            assert!(is_visible(feature, &b));
        }
    }

    #[test]
    fn features_without_geometry_are_dropped() {
        let mut collection = project_nodes(&ways(), &Default::default());
        collection.features[0].geometry = None;
        let visible = LinearScan.filter(&collection, &bounds());
        assert!(visible
            .features
            .iter()
            .all(|feature| feature.geometry.is_some()));
    }
}
