//! Text laid out along a perimeter path.
//!
//! The source text is repeated (each repetition followed by a filler
//! character) until its rendered width covers the whole path. Every segment
//! then offers a number of character slots; slots are filled in path order
//! with the repeated text until either runs out.
//!
//! Arc slots are spaced by equal angles: the slot count comes from the arc
//! length, the sweep is then divided evenly. This is not constant arc-length
//! spacing, and the trail's appearance depends on it staying that way.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::geometry::Point;
use crate::perimeter::{PerimeterPath, PerimeterSegment};

/// Character appended after each repetition of the source text.
pub const FILLER: char = '*';

/// Upper bound on characters in a trail.
const MAX_TRAIL_CHARS: f64 = 100_000.0;

/// A single character placed on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphPlacement {
    pub character: char,
    pub position: Point,
    pub rotation_degrees: f64,
}

/// The result of laying text along a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerimeterTextLayout {
    source_text: String,
    repeated_text: String,
    placements: Vec<GlyphPlacement>,
}

impl PerimeterTextLayout {
    /// The text the trail was built from.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// The source text repeated to cover the path.
    pub fn repeated_text(&self) -> &str {
        &self.repeated_text
    }

    /// Placements in path order.
    pub fn placements(&self) -> &[GlyphPlacement] {
        &self.placements
    }
}

/// Lay `source_text` along `path` with the default filler.
pub fn layout(source_text: &str, advance: f64, path: &PerimeterPath) -> Result<PerimeterTextLayout> {
    layout_with_filler(source_text, FILLER, advance, path)
}

/// Lay `source_text` along `path`, using `advance` as the width of every
/// character.
pub fn layout_with_filler(
    source_text: &str,
    filler: char,
    advance: f64,
    path: &PerimeterPath,
) -> Result<PerimeterTextLayout> {
    if !advance.is_finite() || advance <= 0.0 {
        return Err(CoreError::InvalidGeometry(format!(
            "character advance must be positive, got {advance}"
        )));
    }
    let total_length = path.total_length();
    if total_length / advance > MAX_TRAIL_CHARS {
        return Err(CoreError::InvalidGeometry(format!(
            "path of length {total_length} needs too many characters at advance {advance}"
        )));
    }

    let repeated_text = repeat_to_cover(source_text, filler, advance, total_length);
    let placements = place_along(&repeated_text, advance, path);
    debug!(
        path_length = total_length,
        repeated = repeated_text.chars().count(),
        placed = placements.len(),
        "perimeter text laid out"
    );

    Ok(PerimeterTextLayout {
        source_text: source_text.to_string(),
        repeated_text,
        placements,
    })
}

/// Append `source + filler` until `chars * advance >= length`.
fn repeat_to_cover(source: &str, filler: char, advance: f64, length: f64) -> String {
    let unit_chars = source.chars().count() + 1;
    let mut text = String::new();
    let mut chars = 0usize;
    while (chars as f64) * advance < length {
        text.push_str(source);
        text.push(filler);
        chars += unit_chars;
    }
    text
}

/// Fill every slot of the path, in order, with the characters of `text`.
fn place_along(text: &str, advance: f64, path: &PerimeterPath) -> Vec<GlyphPlacement> {
    path.segments()
        .iter()
        .flat_map(|segment| segment_slots(segment, advance))
        .zip(text.chars())
        .map(|((position, rotation_degrees), character)| GlyphPlacement {
            character,
            position,
            rotation_degrees,
        })
        .collect()
}

/// Character positions and rotations offered by one segment.
fn segment_slots(segment: &PerimeterSegment, advance: f64) -> Vec<(Point, f64)> {
    let count = (segment.length() / advance).floor() as usize;
    match *segment {
        PerimeterSegment::Line {
            start,
            direction,
            rotation_degrees,
            ..
        } => (0..count)
            .map(|i| (start + direction * (i as f64 * advance), rotation_degrees))
            .collect(),
        PerimeterSegment::Arc {
            center,
            radius,
            start_angle_degrees,
            sweep_degrees,
        } => {
            if count == 0 {
                return Vec::new();
            }
            let step = sweep_degrees / count as f64;
            (0..count)
                .map(|i| {
                    let angle = start_angle_degrees + i as f64 * step;
                    (center.on_circle(radius, angle), angle + 90.0)
                })
                .collect()
        }
    }
}
