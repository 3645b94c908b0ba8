//! Stable per-entity colors.
//!
//! The i-th entity of a collection receives the hue `i × golden angle`, which
//! keeps neighbouring entries far apart on the color wheel no matter how long
//! the collection grows.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::model::Polyline;

/// 360° × (1 − 1/φ).
pub const GOLDEN_ANGLE_DEGREES: f64 = 137.507_764_050_037_85;

pub const SATURATION: f64 = 60.0;
pub const LIGHTNESS: f64 = 50.0;

/// Fallback for ids without an assignment.
pub const FALLBACK_COLOR: &str = "#000000";

/// An HSL color with saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Color {
    /// Color for the entity at `index` in presentation order.
    pub fn for_index(index: usize) -> Self {
        Self {
            hue: (index as f64 * GOLDEN_ANGLE_DEGREES) % 360.0,
            saturation: SATURATION,
            lightness: LIGHTNESS,
        }
    }

    /// `#rrggbb` form for surfaces that do not understand CSS `hsl()`.
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let s = self.saturation / 100.0;
        let l = self.lightness / 100.0;
        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let sector = self.hue / 60.0;
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({:.3}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Mapping from entity id to its color.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorAssignment {
    colors: HashMap<String, Color>,
}

impl ColorAssignment {
    pub fn get(&self, id: &str) -> Option<Color> {
        self.colors.get(id).copied()
    }

    /// CSS color string for `id`, falling back to black.
    pub fn css(&self, id: &str) -> String {
        self.get(id)
            .map(|color| color.to_string())
            .unwrap_or_else(|| FALLBACK_COLOR.to_string())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Assign a color to each entity by its position in `entities`.
///
/// Ids are only used as keys; the color depends on the index alone. A repeated
/// id keeps the color of its last occurrence.
pub fn assign_colors<P: Polyline>(entities: &[P]) -> ColorAssignment {
    let colors = entities
        .iter()
        .enumerate()
        .map(|(index, entity)| (entity.id().to_string(), Color::for_index(index)))
        .collect();
    ColorAssignment { colors }
}
