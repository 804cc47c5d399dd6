// Copyright © 2026 the Contributors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Turns a font's contour description into a flat, closed sequence of quadratic
//! Béziers per glyph.
//!
//! The font itself is out of scope: callers provide contours through [`OutlineSource`],
//! a capability set rather than a concrete font-format binding, matching how this
//! crate's rendering layer treats any particular font backend as a pluggable detail.

use crate::config::Config;
use crate::cubic::{self, Cubic};
use crate::error::GlyphBuildError;
use crate::geometry::{Bezier2, Vec2};
use std::error::Error as StdError;

/// How a single contour point participates in the outline.
///
/// TrueType outlines only ever use `OnCurve` and `QuadraticControl`; CFF/PostScript
/// outlines use `OnCurve` and pairs of `CubicControl1`/`CubicControl2`. A single
/// `OutlineSource` implementation is expected to emit one family or the other per
/// glyph, though the extractor does not require it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointKind {
    OnCurve,
    QuadraticControl,
    CubicControl1,
    CubicControl2,
}

/// One point of a raw contour, in the font's own units (not yet normalized to the
/// glyph's em-box origin).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutlinePoint {
    pub position: Vec2,
    pub kind: PointKind,
}

/// A closed, cyclic sequence of raw contour points, as reported by the font.
pub type RawContour = Vec<OutlinePoint>;

/// Horizontal layout metrics for one glyph, in font units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphMetrics {
    pub bearing: Vec2,
    pub advance: f32,
}

/// Capability set an outline provider must implement: iterate contours, classify
/// on/off-curve points, and report the glyph's bounding rectangle and horizontal
/// layout metrics. Deliberately not an inheritance hierarchy — a concrete font
/// library (FreeType, a `glyf`/`CFF ` table reader, CoreText, ...) implements this
/// directly against its own glyph ID type.
pub trait OutlineSource {
    type Error: StdError;

    /// Returns one `RawContour` per closed contour of the glyph. An empty result
    /// means the glyph has no visible outline (e.g. whitespace).
    fn contours(&self, glyph_id: u32) -> Result<Vec<RawContour>, Self::Error>;

    /// The glyph's bounding rectangle `(minX, minY, maxX, maxY)`, taken from the
    /// font's stored metrics rather than recomputed from control points, so the
    /// normalized `[0,1]²` grid matches the shader's quad exactly.
    fn glyph_box(&self, glyph_id: u32) -> Result<(f32, f32, f32, f32), Self::Error>;

    /// Horizontal bearing and advance for the glyph, in font units.
    fn glyph_metrics(&self, glyph_id: u32) -> Result<GlyphMetrics, Self::Error>;
}

/// A non-negative glyph bounding box, in font units, after normalization to the origin.
pub type GlyphBox = Vec2;

/// A flattened contour: a closed cycle of quadratic Béziers.
pub type Contour = Vec<Bezier2>;

/// One glyph's outline: every contour's curves concatenated, plus the metrics
/// needed to place and advance it.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub curves: Vec<Bezier2>,
    pub size: GlyphBox,
    pub bearing: Vec2,
    pub advance: f32,
}

/// Extracts `glyph_id`'s outline from `source`, flattening cubic segments via
/// [`cubic::flatten`] and emitting a flat `Vec<Bezier2>` whose consecutive segments
/// share endpoints exactly (`seg[i].e1 == seg[i+1].e0`).
pub fn extract_glyph<S: OutlineSource>(
    source: &S,
    glyph_id: u32,
    cfg: &Config,
) -> Result<Glyph, GlyphBuildError> {
    let raw_contours = source
        .contours(glyph_id)
        .map_err(|e| GlyphBuildError::OutlineProvider(e.to_string()))?;
    let (min_x, min_y, max_x, max_y) = source
        .glyph_box(glyph_id)
        .map_err(|e| GlyphBuildError::OutlineProvider(e.to_string()))?;
    let metrics = source
        .glyph_metrics(glyph_id)
        .map_err(|e| GlyphBuildError::OutlineProvider(e.to_string()))?;

    let origin = Vec2::new(min_x, min_y);
    let mut curves = Vec::new();

    for contour in &raw_contours {
        if contour.is_empty() {
            continue;
        }
        let translated: Vec<OutlinePoint> = contour
            .iter()
            .map(|p| OutlinePoint { position: p.position - origin, kind: p.kind })
            .collect();
        curves.extend(flatten_contour(&translated, cfg));
    }

    if curves.is_empty() {
        return Err(GlyphBuildError::OutlineEmpty);
    }

    Ok(Glyph {
        curves,
        size: Vec2::new(max_x - min_x, max_y - min_y),
        bearing: metrics.bearing,
        advance: metrics.advance,
    })
}

/// Rotates `points` so that index 0 is on-curve, synthesizing the TrueType implied
/// midpoint when the whole contour is made of consecutive off-curve quadratic points.
fn rotate_to_on_curve(points: &[OutlinePoint]) -> Vec<OutlinePoint> {
    match points.iter().position(|p| p.kind == PointKind::OnCurve) {
        Some(start) => {
            let mut rotated = Vec::with_capacity(points.len());
            rotated.extend_from_slice(&points[start..]);
            rotated.extend_from_slice(&points[..start]);
            rotated
        }
        None => {
            let synthetic = OutlinePoint {
                position: points[points.len() - 1].position.lerp(points[0].position, 0.5),
                kind: PointKind::OnCurve,
            };
            let mut rotated = Vec::with_capacity(points.len() + 1);
            rotated.push(synthetic);
            rotated.extend_from_slice(points);
            rotated
        }
    }
}

enum Pending {
    None,
    Quadratic(Vec2),
    CubicFirst(Vec2),
    Cubic(Vec2, Vec2),
}

fn flatten_contour(points: &[OutlinePoint], cfg: &Config) -> Vec<Bezier2> {
    let rotated = rotate_to_on_curve(points);
    let n = rotated.len();
    let mut curves = Vec::new();
    let mut start = rotated[0].position;
    let mut pending = Pending::None;

    // Walk one extra step to close the loop back onto `rotated[0]`, which is
    // guaranteed on-curve, so any pending control is always resolved by the end.
    for i in 1..=n {
        let point = &rotated[i % n];
        pending = match (point.kind, pending) {
            (PointKind::OnCurve, Pending::None) => {
                curves.push(Bezier2::line(start, point.position));
                start = point.position;
                Pending::None
            }
            (PointKind::OnCurve, Pending::Quadratic(ctrl)) => {
                curves.push(Bezier2::new(start, ctrl, point.position));
                start = point.position;
                Pending::None
            }
            (PointKind::OnCurve, Pending::Cubic(c1, c2)) => {
                let cubic = Cubic::new(start, c1, c2, point.position);
                curves.extend(cubic::flatten(
                    &cubic,
                    cfg.cubic_tolerance,
                    cfg.max_cubic_subdivision_depth,
                ));
                start = point.position;
                Pending::None
            }
            (PointKind::QuadraticControl, Pending::None) => Pending::Quadratic(point.position),
            (PointKind::QuadraticControl, Pending::Quadratic(prev_ctrl)) => {
                let implied = prev_ctrl.lerp(point.position, 0.5);
                curves.push(Bezier2::new(start, prev_ctrl, implied));
                start = implied;
                Pending::Quadratic(point.position)
            }
            (PointKind::CubicControl1, Pending::None) => Pending::CubicFirst(point.position),
            (PointKind::CubicControl2, Pending::CubicFirst(c1)) => {
                Pending::Cubic(c1, point.position)
            }
            // A malformed mix of cubic and quadratic controls between two on-curve
            // points: drop the stale pending control rather than propagate an
            // inconsistent curve. A real font never produces this.
            (PointKind::QuadraticControl, _) => Pending::Quadratic(point.position),
            (PointKind::CubicControl1, _) => Pending::CubicFirst(point.position),
            (PointKind::CubicControl2, _) => Pending::None,
            (PointKind::OnCurve, Pending::CubicFirst(_)) => {
                curves.push(Bezier2::line(start, point.position));
                start = point.position;
                Pending::None
            }
        };
    }

    curves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(x: f32, y: f32) -> OutlinePoint {
        OutlinePoint { position: Vec2::new(x, y), kind: PointKind::OnCurve }
    }

    fn off(x: f32, y: f32) -> OutlinePoint {
        OutlinePoint { position: Vec2::new(x, y), kind: PointKind::QuadraticControl }
    }

    fn assert_closed(curves: &[Bezier2]) {
        for i in 0..curves.len() {
            let next = &curves[(i + 1) % curves.len()];
            assert_eq!(curves[i].e1, next.e0, "segment {} does not close onto the next", i);
        }
    }

    #[test]
    fn rectangle_contour_of_four_on_curve_points() {
        // A perfectly straight-edged rectangle, every vertex on-curve.
        let points = vec![on(0.0, 0.0), on(10.0, 0.0), on(10.0, 10.0), on(0.0, 10.0)];
        let cfg = Config::default();
        let curves = flatten_contour(&points, &cfg);
        assert_eq!(curves.len(), 4);
        for curve in &curves {
            assert_eq!(curve.c, curve.e0.lerp(curve.e1, 0.5));
        }
        assert_closed(&curves);
    }

    #[test]
    fn implied_on_curve_point_between_two_off_curve_points() {
        let points = vec![on(0.0, 0.0), off(5.0, 10.0), off(10.0, 0.0)];
        let cfg = Config::default();
        let curves = flatten_contour(&points, &cfg);
        // One explicit quadratic in, one implied-midpoint quadratic out, closing back.
        assert_eq!(curves.len(), 2);
        assert_closed(&curves);
    }

    #[test]
    fn all_off_curve_contour_synthesizes_a_start_point() {
        let points = vec![off(0.0, 10.0), off(10.0, 10.0), off(10.0, 0.0), off(0.0, 0.0)];
        let cfg = Config::default();
        let curves = flatten_contour(&points, &cfg);
        assert_eq!(curves.len(), 4);
        assert_closed(&curves);
    }

    #[derive(Debug)]
    struct StubError(String);
    impl std::fmt::Display for StubError {
        fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }
    impl StdError for StubError {}

    struct RectangleSource;
    impl OutlineSource for RectangleSource {
        type Error = StubError;
        fn contours(&self, _glyph_id: u32) -> Result<Vec<RawContour>, StubError> {
            Ok(vec![vec![on(0.0, 0.0), on(100.0, 0.0), on(100.0, 100.0), on(0.0, 100.0)]])
        }
        fn glyph_box(&self, _glyph_id: u32) -> Result<(f32, f32, f32, f32), StubError> {
            Ok((0.0, 0.0, 100.0, 100.0))
        }
        fn glyph_metrics(&self, _glyph_id: u32) -> Result<GlyphMetrics, StubError> {
            Ok(GlyphMetrics { bearing: Vec2::new(2.0, 0.0), advance: 110.0 })
        }
    }

    #[test]
    fn extract_glyph_normalizes_to_origin_and_preserves_metrics() {
        let cfg = Config::default();
        let glyph = extract_glyph(&RectangleSource, 0, &cfg).unwrap();
        assert_eq!(glyph.size, Vec2::new(100.0, 100.0));
        assert_eq!(glyph.advance, 110.0);
        assert_eq!(glyph.curves.len(), 4);
        assert_closed(&glyph.curves);
    }

    struct EmptySource;
    impl OutlineSource for EmptySource {
        type Error = StubError;
        fn contours(&self, _glyph_id: u32) -> Result<Vec<RawContour>, StubError> {
            Ok(vec![])
        }
        fn glyph_box(&self, _glyph_id: u32) -> Result<(f32, f32, f32, f32), StubError> {
            Ok((0.0, 0.0, 0.0, 0.0))
        }
        fn glyph_metrics(&self, _glyph_id: u32) -> Result<GlyphMetrics, StubError> {
            Ok(GlyphMetrics { bearing: Vec2::zero(), advance: 40.0 })
        }
    }

    #[test]
    fn empty_outline_is_reported() {
        let cfg = Config::default();
        let err = extract_glyph(&EmptySource, 0, &cfg).unwrap_err();
        assert_eq!(err, GlyphBuildError::OutlineEmpty);
    }
}
