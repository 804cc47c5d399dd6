// Copyright © 2026 the Contributors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Builds a fixed-size spatial index of a glyph's curves: the `VGrid`.
//!
//! Every cell lists the (at most four) curves whose rectangle it intersects, plus
//! whether the cell's geometric center lies inside the filled outline. Both facts
//! are encoded into four bytes per cell so the result can be written directly into
//! one RGBA8 texel of the grid atlas (see [`crate::atlas`]).

use crate::config::{MAX_CURVES_PER_CELL, MAX_CURVES_PER_GLYPH, SLOT_EMPTY_HIGH, SLOT_EMPTY_LOW};
use crate::error::GlyphBuildError;
use crate::geometry::{Bezier2, Rect, Vec2};
use smallvec::SmallVec;

/// One grid cell: up to four curve references, sentinel-encoded so that the
/// relative order of the trailing non-curve bytes records `midInside`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub slots: [u8; MAX_CURVES_PER_CELL],
}

impl Cell {
    fn encode(curve_indices: &[usize], mid_inside: bool) -> Cell {
        let mut slots = [0u8; MAX_CURVES_PER_CELL];
        let mut i = 0;
        for &idx in curve_indices {
            slots[i] = (idx + 2) as u8;
            i += 1;
        }

        let sentinels =
            if mid_inside { [SLOT_EMPTY_HIGH, SLOT_EMPTY_LOW] } else { [SLOT_EMPTY_LOW, SLOT_EMPTY_HIGH] };
        for &sentinel in &sentinels {
            if i >= MAX_CURVES_PER_CELL {
                break;
            }
            slots[i] = sentinel;
            i += 1;
        }
        // Any slots beyond the sentinel pair are already zero from the array init.

        Cell { slots }
    }

    /// The curve indices (not `+2`-biased) this cell references, in slot order.
    pub fn curve_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().filter(|&&s| s >= 2).map(|&s| (s - 2) as usize)
    }

    pub fn curve_count(&self) -> usize {
        self.slots.iter().filter(|&&s| s >= 2).count()
    }

    /// Recovers `midInside` from the trailing sentinel bytes.
    ///
    /// Undefined (returns `false`) for a cell with all four slots occupied by real
    /// curves, since there is then no room left to encode the flag; such a cell's
    /// coverage is fully determined by its curves regardless.
    pub fn mid_inside(&self) -> bool {
        let mut sentinels = self.slots.iter().copied().filter(|&s| s < 2);
        match (sentinels.next(), sentinels.next()) {
            (Some(a), Some(b)) => a > b,
            (Some(a), None) => a == SLOT_EMPTY_HIGH,
            (None, None) => false,
        }
    }
}

/// A fixed `W × H` spatial index over one glyph's em-box.
#[derive(Clone, Debug, PartialEq)]
pub struct VGrid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Cell>,
}

impl VGrid {
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[y * self.width + x]
    }
}

/// Builds the `VGrid` for one glyph's curves.
///
/// `glyph_size` is the glyph's em-box size (`maxX - minX`, `maxY - minY`), matching
/// the font-reported bounds the curves have already been normalized against.
pub fn build(curves: &[Bezier2], glyph_size: Vec2, width: usize, height: usize) -> Result<VGrid, GlyphBuildError> {
    if curves.len() > MAX_CURVES_PER_GLYPH {
        return Err(GlyphBuildError::TooManyCurvesInGlyph { count: curves.len() });
    }

    let mut cell_curves: Vec<SmallVec<[usize; MAX_CURVES_PER_CELL]>> =
        vec![SmallVec::new(); width * height];

    let cell_w = glyph_size.x / width as f32;
    let cell_h = glyph_size.y / height as f32;

    for (curve_index, curve) in curves.iter().enumerate() {
        let bbox = curve.bounding_box();
        let to_grid = Vec2::new(width as f32 / glyph_size.x, height as f32 / glyph_size.y);

        let min_cell = bbox.origin.scale_xy(to_grid).floor();
        let max_cell = (bbox.lower_right().scale_xy(to_grid)).ceil() - Vec2::splat(1.0);

        let min_cx = clamp_index(min_cell.x, width);
        let max_cx = clamp_index(max_cell.x, width);
        let min_cy = clamp_index(min_cell.y, height);
        let max_cy = clamp_index(max_cell.y, height);

        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                let cell_rect = Rect::new(
                    Vec2::new(cx as f32 * cell_w, cy as f32 * cell_h),
                    Vec2::new(cell_w, cell_h),
                );
                if !curve_intersects_cell(curve, &cell_rect) {
                    continue;
                }

                let list = &mut cell_curves[cy * width + cx];
                if list.len() >= MAX_CURVES_PER_CELL {
                    return Err(GlyphBuildError::TooManyCurvesInCell {
                        cell_x: cx,
                        cell_y: cy,
                        count: list.len() + 1,
                    });
                }
                list.push(curve_index);
            }
        }
    }

    let mut cells = Vec::with_capacity(width * height);
    for cy in 0..height {
        for cx in 0..width {
            let center = Vec2::new(
                (cx as f32 + 0.5) / width as f32 * glyph_size.x,
                (cy as f32 + 0.5) / height as f32 * glyph_size.y,
            );
            let mid_inside = is_inside(curves, center);
            cells.push(Cell::encode(&cell_curves[cy * width + cx], mid_inside));
        }
    }

    Ok(VGrid { width, height, cells })
}

fn clamp_index(v: f32, bound: usize) -> usize {
    if v.is_nan() || v < 0.0 {
        0
    } else if v >= bound as f32 {
        bound - 1
    } else {
        v as usize
    }
}

/// The finer cell-incidence test from §4.4: a curve intersects a cell if any of its
/// parametric points at `t ∈ {0, 1}`, or where it crosses one of the cell's four
/// boundary lines, falls within the cell's (inclusive) rectangle.
fn curve_intersects_cell(curve: &Bezier2, cell: &Rect) -> bool {
    let candidate_ts = [0.0, 1.0];
    for &t in &candidate_ts {
        if cell.contains_point(curve.eval(t)) {
            return true;
        }
    }

    for &x in &[cell.min_x(), cell.max_x()] {
        for t in curve.solve_for_x(x) {
            if cell.contains_point(curve.eval(t)) {
                return true;
            }
        }
    }
    for &y in &[cell.min_y(), cell.max_y()] {
        for t in curve.solve_for_y_inclusive(y) {
            if cell.contains_point(curve.eval(t)) {
                return true;
            }
        }
    }

    false
}

/// Even-odd ray cast from `center` toward `+∞` along `x`, against the whole glyph's
/// curve list (not just the cell's short list), per §4.4 step 3.
fn is_inside(curves: &[Bezier2], center: Vec2) -> bool {
    let mut crossings = 0u32;
    for curve in curves {
        for t in curve.solve_for_y(center.y) {
            if curve.eval(t).x > center.x {
                crossings += 1;
            }
        }
    }
    crossings % 2 == 1
}
