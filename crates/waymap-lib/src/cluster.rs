//! Grid clustering for dense point layers.
//!
//! The viewport is cut into `grid × grid` cells and every cell holding at least
//! one point collapses into a single point at the mean coordinate. Cells are
//! emitted in row-major order so the output is deterministic.

use std::collections::BTreeMap;

use geojson::{FeatureCollection, JsonObject, JsonValue, Value};

use crate::geometry::{empty_collection, feature, props};
use crate::viewport::ViewportBounds;

#[derive(Debug)]
struct Cell {
    lat_sum: f64,
    lon_sum: f64,
    count: usize,
    color: Option<JsonValue>,
}

/// Aggregate the point features of `points` that fall inside `bounds`.
///
/// Non-point features and points outside the bounds are ignored. Each output
/// feature carries `cluster: true`, `point_count`, and the color of the first
/// point that landed in its cell.
pub fn cluster_points(
    points: &FeatureCollection,
    bounds: &ViewportBounds,
    grid: usize,
) -> FeatureCollection {
    let grid = grid.max(1);
    let mut cells: BTreeMap<(usize, usize), Cell> = BTreeMap::new();

    for point in &points.features {
        let Some(Value::Point(position)) = point.geometry.as_ref().map(|g| &g.value) else {
            continue;
        };
        let [lon, lat, ..] = position.as_slice() else {
            continue;
        };
        if !bounds.contains(*lat, *lon) {
            continue;
        }

        let key = (
            cell_index(*lat, bounds.min_lat(), bounds.lat_span(), grid),
            cell_index(*lon, bounds.min_lon(), bounds.lon_span(), grid),
        );
        let cell = cells.entry(key).or_insert_with(|| Cell {
            lat_sum: 0.0,
            lon_sum: 0.0,
            count: 0,
            color: point.property(props::COLOR).cloned(),
        });
        cell.lat_sum += *lat;
        cell.lon_sum += *lon;
        cell.count += 1;
    }

    let features = cells
        .into_values()
        .map(|cell| {
            let n = cell.count as f64;
            let mut properties = JsonObject::new();
            properties.insert(props::CLUSTER.to_string(), JsonValue::Bool(true));
            properties.insert(props::POINT_COUNT.to_string(), JsonValue::from(cell.count));
            if let Some(color) = cell.color {
                properties.insert(props::COLOR.to_string(), color);
            }
            feature(
                Value::Point(vec![cell.lon_sum / n, cell.lat_sum / n]),
                properties,
            )
        })
        .collect();

    FeatureCollection {
        features,
        ..empty_collection()
    }
}

fn cell_index(value: f64, min: f64, span: f64, grid: usize) -> usize {
    if span <= 0.0 {
        return 0;
    }
    let scaled = ((value - min) / span * grid as f64).floor() as usize;
    scaled.min(grid - 1)
}
