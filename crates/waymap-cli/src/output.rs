//! Output formatting for rendered map frames.

use std::io::{self, Write};

use clap::ValueEnum;
use geojson::Feature;
use serde::Serialize;

use waymap_lib::geometry::props;
use waymap_lib::{feature_id, RenderFrame};

/// How a frame is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every layer as one JSON document.
    #[default]
    Json,
    /// Only the path layer, as a GeoJSON `FeatureCollection`.
    Geojson,
    /// One line per path, for reading in a terminal.
    Summary,
}

/// Write `frame` to `out` in the requested format.
pub fn write_frame<W: Write>(out: &mut W, frame: &RenderFrame, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &frame.to_json()),
        OutputFormat::Geojson => write_json(out, frame.paths.as_ref()),
        OutputFormat::Summary => write_summary(out, frame),
    }
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn write_summary<W: Write>(out: &mut W, frame: &RenderFrame) -> io::Result<()> {
    for marker in &frame.markers {
        writeln!(out, "{}: {}", marker.role.label(), marker.at)?;
    }

    if frame.paths.features.is_empty() {
        writeln!(out, "No paths.")?;
    }
    for feature in &frame.paths.features {
        writeln!(out, "{}", summary_line(feature))?;
    }

    if let Some(ways) = &frame.ways {
        writeln!(out, "Ways in view: {}", ways.features.len())?;
    }
    if let Some(notice) = &frame.notice {
        writeln!(out, "Note: {notice}")?;
    }
    Ok(())
}

fn summary_line(feature: &Feature) -> String {
    let id = feature_id(feature).unwrap_or("<unknown>");
    let distance = feature
        .property(props::DISTANCE)
        .and_then(|value| value.as_f64())
        .map(|d| format!("{d:.0} m"))
        .unwrap_or_else(|| "-".to_string());
    let color = feature
        .property(props::COLOR)
        .and_then(|value| value.as_str())
        .unwrap_or("");
    format!("Path ID: {id} | Distance: {distance} | {color}")
}
