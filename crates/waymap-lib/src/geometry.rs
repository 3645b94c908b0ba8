//! Projection of ways, paths and nodes into GeoJSON feature collections.
//!
//! Output positions use GeoJSON order (`[lon, lat]`). Each feature carries the
//! properties the rendering surface styles by: `id`, `color` and, for paths,
//! `distance`. Node features additionally carry `way_id`.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::color::ColorAssignment;
use crate::model::{Polyline, Way};

/// Property keys shared with the rendering surface.
pub mod props {
    pub const ID: &str = "id";
    pub const COLOR: &str = "color";
    pub const DISTANCE: &str = "distance";
    pub const WAY_ID: &str = "way_id";
    pub const CLUSTER: &str = "cluster";
    pub const POINT_COUNT: &str = "point_count";
}

/// An empty, valid feature collection.
pub fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}

/// One `LineString` feature per entity, in input order.
pub fn project_lines<P: Polyline>(entities: &[P], colors: &ColorAssignment) -> FeatureCollection {
    let features = entities
        .iter()
        .map(|entity| {
            let coordinates = entity
                .nodes()
                .iter()
                .map(|node| vec![node.lon, node.lat])
                .collect();

            let mut properties = JsonObject::new();
            properties.insert(props::ID.to_string(), JsonValue::from(entity.id()));
            properties.insert(
                props::COLOR.to_string(),
                JsonValue::from(colors.css(entity.id())),
            );
            if let Some(distance) = entity.distance() {
                properties.insert(props::DISTANCE.to_string(), JsonValue::from(distance));
            }

            feature(Value::LineString(coordinates), properties)
        })
        .collect();

    FeatureCollection {
        features,
        ..empty_collection()
    }
}

/// One `Point` feature per node, tagged with its owning way and that way's color.
pub fn project_nodes(ways: &[Way], colors: &ColorAssignment) -> FeatureCollection {
    let total: usize = ways.iter().map(|way| way.nodes.len()).sum();
    let mut features = Vec::with_capacity(total);

    for way in ways {
        let color = colors.css(&way.id);
        for node in &way.nodes {
            let mut properties = JsonObject::new();
            properties.insert(props::ID.to_string(), JsonValue::from(node.id.as_str()));
            properties.insert(props::WAY_ID.to_string(), JsonValue::from(way.id.as_str()));
            properties.insert(props::COLOR.to_string(), JsonValue::from(color.as_str()));
            features.push(feature(Value::Point(vec![node.lon, node.lat]), properties));
        }
    }

    FeatureCollection {
        features,
        ..empty_collection()
    }
}

/// Read the `id` property of a feature.
pub fn feature_id(feature: &Feature) -> Option<&str> {
    feature.property(props::ID).and_then(JsonValue::as_str)
}

pub(crate) fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::assign_colors;
    use crate::model::{Node, Path};

    fn sample_ways() -> Vec<Way> {
        vec![
            Way::new(
                "w1",
                vec![Node::new("1", 51.0, 4.0), Node::new("2", 51.1, 4.1)],
            ),
            Way::new("w2", vec![Node::new("3", 51.2, 4.2)]),
        ]
    }

    #[test]
    fn empty_ways_give_empty_collection() {
        let ways: Vec<Way> = Vec::new();
        let colors = assign_colors(&ways);
        assert!(project_lines(&ways, &colors).features.is_empty());
        assert!(project_nodes(&ways, &colors).features.is_empty());
    }

    #[test]
    fn lines_use_lon_lat_order_and_carry_color() {
        let ways = sample_ways();
        let colors = assign_colors(&ways);
        let collection = project_lines(&ways, &colors);

        assert_eq!(collection.features.len(), 2);
        let first = &collection.features[0];
        assert_eq!(feature_id(first), Some("w1"));
        assert_eq!(
            first.property(props::COLOR).and_then(JsonValue::as_str),
            Some(colors.css("w1").as_str())
        );
        assert!(first.property(props::DISTANCE).is_none());
        match &first.geometry.as_ref().unwrap().value {
            Value::LineString(coords) => {
                assert_eq!(coords, &vec![vec![4.0, 51.0], vec![4.1, 51.1]]);
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn paths_carry_distance() {
        let paths = vec![Path::new("p1", 512.5, vec![Node::new("1", 0.0, 0.0)])];
        let colors = assign_colors(&paths);
        let collection = project_lines(&paths, &colors);
        assert_eq!(
            collection.features[0]
                .property(props::DISTANCE)
                .and_then(JsonValue::as_f64),
            Some(512.5)
        );
    }

    #[test]
    fn nodes_inherit_way_color() {
        let ways = sample_ways();
        let colors = assign_colors(&ways);
        let collection = project_nodes(&ways, &colors);

        assert_eq!(collection.features.len(), 3);
        let last = &collection.features[2];
        assert_eq!(feature_id(last), Some("3"));
        assert_eq!(
            last.property(props::WAY_ID).and_then(JsonValue::as_str),
            Some("w2")
        );
        assert_eq!(
            last.property(props::COLOR).and_then(JsonValue::as_str),
            Some(colors.css("w2").as_str())
        );
    }

    #[test]
    fn missing_color_falls_back_to_black() {
        let ways = sample_ways();
        let collection = project_lines(&ways, &ColorAssignment::default());
        assert_eq!(
            collection.features[0]
                .property(props::COLOR)
                .and_then(JsonValue::as_str),
            Some("#000000")
        );
    }
}
