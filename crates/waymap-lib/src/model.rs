//! Domain entities received from the routing service.
//!
//! Nodes, ways and paths are immutable snapshots: the engine never edits them
//! in place, it only replaces whole collections.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// GeoJSON position order (`[lon, lat]`).
    pub fn position(&self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// A user-placed selection point.
pub type Marker = LatLon;

/// A single vertex of a way or path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
        }
    }

    pub fn location(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// A road segment as an ordered polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Way {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Way {
    pub fn new(id: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            id: id.into(),
            nodes,
        }
    }
}

/// A candidate route returned by one of the search strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Total length in meters.
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Path {
    pub fn new(id: impl Into<String>, distance: f64, nodes: Vec<Node>) -> Self {
        Self {
            id: id.into(),
            distance,
            nodes,
        }
    }
}

/// Anything the projector can turn into a line feature.
pub trait Polyline {
    fn id(&self) -> &str;
    fn nodes(&self) -> &[Node];
    /// Length in meters, when the entity carries one.
    fn distance(&self) -> Option<f64> {
        None
    }
}

impl Polyline for Way {
    fn id(&self) -> &str {
        &self.id
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl Polyline for Path {
    fn id(&self) -> &str {
        &self.id
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn distance(&self) -> Option<f64> {
        Some(self.distance)
    }
}

/// Accept identifiers as JSON strings or integers.
///
/// The routing backend serializes OSM ids as unsigned integers, while other
/// producers send strings; both normalize to `String`.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer identifier")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
