// Copyright © 2026 the Contributors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tunables for outline conversion, grid construction, and atlas sizing.
//!
//! Everything here has a sensible default; the values are broken out so that a
//! particular font or renderer can retune them without touching the algorithms.

/// Number of cells along one side of every glyph's [`VGrid`](crate::grid::VGrid).
///
/// The shader contract (and the 4-slot-per-cell encoding) is written against this
/// being square; changing `W` without changing the shader that consumes the grid
/// atlas will misrender.
pub const GRID_SIZE: usize = 20;

/// Maximum number of curves a single grid cell may reference.
///
/// Fixed by the RGBA8 texel used to store a cell: one byte per slot.
pub const MAX_CURVES_PER_CELL: usize = 4;

/// Side length, in texels, of the grid atlas (`gridAtlas`).
pub const GRID_ATLAS_SIZE: u32 = 256;

/// Side length, in RGBA8 pixels, of the glyph-data atlas (`glyphData`).
pub const BEZIER_ATLAS_SIZE: u32 = 256;

/// Total texel capacity of one glyph-data atlas group.
pub const BEZIER_ATLAS_TEXELS: u32 = BEZIER_ATLAS_SIZE * BEZIER_ATLAS_SIZE;

/// Sentinel slot values. See [`crate::grid`] for how they encode `midInside`.
pub const SLOT_EMPTY_LOW: u8 = 0;
pub const SLOT_EMPTY_HIGH: u8 = 1;

/// Largest number of curves one glyph's flattened outline may contain.
///
/// A slot stores `index + 2` in a `u8`, so the highest representable index is
/// `u8::MAX - 2` (253); one more curve than that collides with the sentinel bytes.
pub const MAX_CURVES_PER_GLYPH: usize = u8::MAX as usize - 1;

/// Configuration for building glyph representations.
///
/// `Config::default()` matches the fixed encoding this crate's atlases and shader
/// contract assume; only `cubic_tolerance` is meaningfully adjustable per font.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Maximum sup-norm error, in glyph units, allowed when approximating a cubic
    /// Bézier segment with a chain of quadratics.
    ///
    /// The source material this format was distilled from leaves this as a free
    /// constant; we default it to a small fraction of a typical 1000-2048 unit em,
    /// which keeps cusps and tight curves faithful without exploding curve counts
    /// on fonts with heavy cubic outlines (e.g. CFF/PostScript fonts).
    pub cubic_tolerance: f32,

    /// Maximum recursion depth for cubic subdivision.
    pub max_cubic_subdivision_depth: u32,

    /// Width and height of each glyph's [`VGrid`](crate::grid::VGrid), in cells.
    pub grid_size: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            cubic_tolerance: 0.5,
            max_cubic_subdivision_depth: 10,
            grid_size: GRID_SIZE,
        }
    }
}
