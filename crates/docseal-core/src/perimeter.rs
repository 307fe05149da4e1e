//! Rounded-rectangle perimeter paths.
//!
//! A path is 8 contiguous segments: 4 straight edges and 4 quarter arcs.
//! Traversal starts on the bottom edge just after the bottom-left corner and
//! runs bottom → bottom-right arc → right → top-right arc → top → top-left arc
//! → left → bottom-left arc, ending where it started.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::geometry::Point;

/// One piece of a perimeter path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PerimeterSegment {
    /// A straight edge. `direction` is a unit vector.
    Line {
        start: Point,
        direction: Point,
        length: f64,
        rotation_degrees: f64,
    },
    /// A circular arc. Angles are measured counter-clockwise from +x.
    Arc {
        center: Point,
        radius: f64,
        start_angle_degrees: f64,
        sweep_degrees: f64,
    },
}

impl PerimeterSegment {
    /// Length along the segment.
    pub fn length(&self) -> f64 {
        match *self {
            Self::Line { length, .. } => length,
            Self::Arc {
                radius,
                sweep_degrees,
                ..
            } => radius * sweep_degrees.abs().to_radians(),
        }
    }

    pub fn start_point(&self) -> Point {
        match *self {
            Self::Line { start, .. } => start,
            Self::Arc {
                center,
                radius,
                start_angle_degrees,
                ..
            } => center.on_circle(radius, start_angle_degrees),
        }
    }

    pub fn end_point(&self) -> Point {
        match *self {
            Self::Line {
                start,
                direction,
                length,
                ..
            } => start + direction * length,
            Self::Arc {
                center,
                radius,
                start_angle_degrees,
                sweep_degrees,
            } => center.on_circle(radius, start_angle_degrees + sweep_degrees),
        }
    }

    pub fn is_arc(&self) -> bool {
        matches!(self, Self::Arc { .. })
    }
}

/// A closed rounded-rectangle path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerimeterPath {
    segments: Vec<PerimeterSegment>,
}

impl PerimeterPath {
    /// Segments in traversal order.
    pub fn segments(&self) -> &[PerimeterSegment] {
        &self.segments
    }

    /// Sum of all segment lengths.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(PerimeterSegment::length).sum()
    }
}

/// Build the perimeter of a rounded rectangle with lower-left corner
/// `(origin_x, origin_y)`.
///
/// Preconditions: all inputs finite, `width > 0`, `height > 0`,
/// `corner_radius >= 0`, and `2 * corner_radius < min(width, height)`.
/// Violations are reported, never clamped.
pub fn build_rounded_rect_path(
    origin_x: f64,
    origin_y: f64,
    width: f64,
    height: f64,
    corner_radius: f64,
) -> Result<PerimeterPath> {
    let inputs = [origin_x, origin_y, width, height, corner_radius];
    if inputs.iter().any(|v| !v.is_finite()) {
        return Err(CoreError::InvalidGeometry("non-finite rectangle".into()));
    }
    if width <= 0.0 || height <= 0.0 {
        return Err(CoreError::InvalidGeometry(format!(
            "rectangle must have positive size, got {width}x{height}"
        )));
    }
    if corner_radius < 0.0 || 2.0 * corner_radius >= width.min(height) {
        return Err(CoreError::InvalidGeometry(format!(
            "corner radius {corner_radius} must be below half of the shorter side"
        )));
    }

    let r = corner_radius;
    let (x, y, w, h) = (origin_x, origin_y, width, height);
    let horizontal = w - 2.0 * r;
    let vertical = h - 2.0 * r;

    let line = |start: Point, direction: Point, length: f64, rotation_degrees: f64| {
        PerimeterSegment::Line {
            start,
            direction,
            length,
            rotation_degrees,
        }
    };
    let quarter = |center: Point, start_angle_degrees: f64| PerimeterSegment::Arc {
        center,
        radius: r,
        start_angle_degrees,
        sweep_degrees: 90.0,
    };

    let segments = vec![
        line(Point::new(x + r, y), Point::new(1.0, 0.0), horizontal, 0.0),
        quarter(Point::new(x + w - r, y + r), 270.0),
        line(Point::new(x + w, y + r), Point::new(0.0, 1.0), vertical, 90.0),
        quarter(Point::new(x + w - r, y + h - r), 0.0),
        line(Point::new(x + w - r, y + h), Point::new(-1.0, 0.0), horizontal, 180.0),
        quarter(Point::new(x + r, y + h - r), 90.0),
        line(Point::new(x, y + h - r), Point::new(0.0, -1.0), vertical, 270.0),
        quarter(Point::new(x + r, y + r), 180.0),
    ];

    Ok(PerimeterPath { segments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-6;

    fn assert_closed(path: &PerimeterPath) {
        let segments = path.segments();
        for i in 0..segments.len() {
            let end = segments[i].end_point();
            let next = segments[(i + 1) % segments.len()].start_point();
            assert!(
                end.distance(next) < TOLERANCE,
                "segment {i} ends at {end:?}, next starts at {next:?}"
            );
        }
    }

    #[test]
    fn test_path_has_eight_alternating_segments() {
        let path = build_rounded_rect_path(0.0, 0.0, 100.0, 50.0, 3.0).unwrap();
        assert_eq!(path.segments().len(), 8);
        for (i, segment) in path.segments().iter().enumerate() {
            assert_eq!(segment.is_arc(), i % 2 == 1);
        }
    }

    #[test]
    fn test_path_closure_and_length() {
        let path = build_rounded_rect_path(0.0, 0.0, 100.0, 50.0, 3.0).unwrap();
        assert_closed(&path);

        let expected = 2.0 * (100.0 - 6.0) + 2.0 * (50.0 - 6.0) + 2.0 * PI * 3.0;
        assert!((path.total_length() - expected).abs() < TOLERANCE);
    }

    #[test]
    fn test_path_starts_after_bottom_left_corner() {
        let path = build_rounded_rect_path(20.0, 30.0, 60.0, 60.0, 5.0).unwrap();
        let start = path.segments()[0].start_point();
        assert!(start.distance(Point::new(25.0, 30.0)) < TOLERANCE);
    }

    #[test]
    fn test_line_rotations() {
        let path = build_rounded_rect_path(0.0, 0.0, 10.0, 10.0, 1.0).unwrap();
        let rotations: Vec<f64> = path
            .segments()
            .iter()
            .filter_map(|s| match s {
                PerimeterSegment::Line {
                    rotation_degrees, ..
                } => Some(*rotation_degrees),
                PerimeterSegment::Arc { .. } => None,
            })
            .collect();
        assert_eq!(rotations, vec![0.0, 90.0, 180.0, 270.0]);
    }

    #[test]
    fn test_zero_radius_is_plain_rectangle() {
        let path = build_rounded_rect_path(0.0, 0.0, 4.0, 2.0, 0.0).unwrap();
        assert_closed(&path);
        assert!((path.total_length() - 12.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_rejects_oversized_radius() {
        assert!(matches!(
            build_rounded_rect_path(0.0, 0.0, 100.0, 50.0, 25.0),
            Err(CoreError::InvalidGeometry(_))
        ));
        assert!(build_rounded_rect_path(0.0, 0.0, 100.0, 50.0, -1.0).is_err());
        assert!(build_rounded_rect_path(0.0, 0.0, 0.0, 50.0, 1.0).is_err());
        assert!(build_rounded_rect_path(f64::NAN, 0.0, 10.0, 10.0, 1.0).is_err());
    }

    proptest! {
        #[test]
        fn random_rectangles_are_closed(
            x in -500.0f64..500.0,
            y in -500.0f64..500.0,
            w in 1.0f64..400.0,
            h in 1.0f64..400.0,
            ratio in 0.0f64..0.49,
        ) {
            let r = w.min(h) * ratio;
            let path = build_rounded_rect_path(x, y, w, h, r).unwrap();
            assert_closed(&path);
            let expected = 2.0 * (w - 2.0 * r) + 2.0 * (h - 2.0 * r) + 2.0 * PI * r;
            prop_assert!((path.total_length() - expected).abs() < TOLERANCE);
        }
    }
}
