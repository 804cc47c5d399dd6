// Copyright © 2026 the Contributors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Packs curves and grids into the two CPU-backed atlases a renderer uploads to the
//! GPU, and documents the bit-exact layout the fragment shader depends on.
//!
//! An [`AtlasGroup`] is append-only: glyphs are placed top-to-bottom in the
//! glyph-data buffer and left-to-right-then-top-to-bottom in the grid atlas.
//! Nothing is ever compacted — curves and grids for a glyph are released together,
//! which in this single-threaded cache means never, so fragmentation can't occur.

use crate::config::{
    BEZIER_ATLAS_TEXELS, GRID_ATLAS_SIZE, GRID_SIZE, MAX_CURVES_PER_CELL,
};
use crate::error::GlyphBuildError;
use crate::geometry::{Bezier2, Vec2};
use crate::grid::VGrid;

/// Where one glyph's representation landed after a successful insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphLocation {
    /// Offset, in texels, of the glyph's header in `glyphData`.
    pub glyph_data_offset: u32,
    /// Top-left corner of the glyph's region in `gridAtlas`, in texels.
    pub grid_pos: (u32, u32),
}

/// Whether an insert landed in this group or needs a fresh one.
enum InsertOutcome {
    Placed(GlyphLocation),
    GroupFull,
}

/// One pair of CPU-side buffers backing a pair of GPU resources: the glyph-data
/// buffer (curve triplets plus a small header, addressed by texel) and the grid
/// atlas (one RGBA8 texel per grid cell).
pub struct AtlasGroup {
    /// Flat half-word buffer. Texel `i`'s two coordinates live at
    /// `glyph_data[2*i]` (x) and `glyph_data[2*i + 1]` (y).
    glyph_data: Vec<u16>,
    /// RGBA8 grid atlas, `GRID_ATLAS_SIZE² ` texels, 4 bytes each.
    grid_atlas: Vec<u8>,
    glyph_data_offset: u32,
    next_grid_pos: (u32, u32),
    full: bool,
    uploaded: bool,
}

impl AtlasGroup {
    pub fn new() -> AtlasGroup {
        AtlasGroup {
            glyph_data: vec![0u16; BEZIER_ATLAS_TEXELS as usize * 2],
            grid_atlas: vec![0u8; GRID_ATLAS_SIZE as usize * GRID_ATLAS_SIZE as usize * 4],
            glyph_data_offset: 0,
            next_grid_pos: (0, 0),
            full: false,
            uploaded: true,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    #[inline]
    pub fn is_uploaded(&self) -> bool {
        self.uploaded
    }

    pub fn mark_uploaded(&mut self) {
        self.uploaded = true;
    }

    /// Raw little-endian bytes a renderer would hand to `glBufferData`, as described
    /// in §6.2: `glyphData` as a 1D buffer.
    pub fn glyph_data_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.glyph_data.len() * 2);
        for word in &self.glyph_data {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    pub fn grid_atlas_bytes(&self) -> &[u8] {
        &self.grid_atlas
    }

    /// Attempts to place one glyph's curves and grid into this group. Leaves both
    /// cursors untouched on any failure (including `GroupFull`), satisfying the
    /// atomicity requirement of §4.5.
    fn try_insert(
        &mut self,
        curves: &[Bezier2],
        grid: &VGrid,
        glyph_size: Vec2,
    ) -> Result<InsertOutcome, GlyphBuildError> {
        let texels_needed = 2 + 3 * curves.len() as u32;
        if texels_needed > BEZIER_ATLAS_TEXELS {
            return Err(GlyphBuildError::BezierBudgetExceeded {
                texels_needed,
                texels_available: BEZIER_ATLAS_TEXELS,
            });
        }
        if self.glyph_data_offset + texels_needed > BEZIER_ATLAS_TEXELS {
            return Ok(InsertOutcome::GroupFull);
        }

        let grid_pos = match self.reserve_grid_region(grid.width, grid.height) {
            Some(pos) => pos,
            None => return Ok(InsertOutcome::GroupFull),
        };

        let offset = self.glyph_data_offset;
        self.write_header(offset, grid_pos, grid.width, grid.height);
        for (i, curve) in curves.iter().enumerate() {
            self.write_curve(offset + 2 + 3 * i as u32, curve, glyph_size);
        }
        self.write_grid(grid_pos, grid);

        self.glyph_data_offset += texels_needed;
        if self.glyph_data_offset >= BEZIER_ATLAS_TEXELS {
            self.full = true;
        }
        self.uploaded = false;

        Ok(InsertOutcome::Placed(GlyphLocation { glyph_data_offset: offset, grid_pos }))
    }

    /// Advances the grid-atlas cursor, wrapping to a new row when a `GRID_SIZE`-wide
    /// column would not fit, and marking the group full when a new row wouldn't
    /// fit either. Does not mutate state on failure.
    fn reserve_grid_region(&mut self, width: usize, height: usize) -> Option<(u32, u32)> {
        let stride = GRID_SIZE as u32;
        debug_assert_eq!(width, GRID_SIZE);
        debug_assert_eq!(height, GRID_SIZE);

        let (mut x, mut y) = self.next_grid_pos;
        if x + stride > GRID_ATLAS_SIZE {
            x = 0;
            y += stride;
        }
        if y + stride > GRID_ATLAS_SIZE {
            self.full = true;
            return None;
        }

        let placed = (x, y);
        x += stride;
        if x + stride > GRID_ATLAS_SIZE {
            x = 0;
            y += stride;
            if y + stride > GRID_ATLAS_SIZE {
                self.full = true;
            }
        }
        self.next_grid_pos = (x, y);
        Some(placed)
    }

    fn write_header(&mut self, offset: u32, grid_pos: (u32, u32), width: usize, height: usize) {
        self.set_texel(offset, grid_pos.0 as u16, grid_pos.1 as u16);
        self.set_texel(offset + 1, width as u16, height as u16);
    }

    fn write_curve(&mut self, offset: u32, curve: &Bezier2, glyph_size: Vec2) {
        for (i, point) in [curve.e0, curve.c, curve.e1].iter().enumerate() {
            let (x, y) = encode_point(*point, glyph_size);
            self.set_texel(offset + i as u32, x, y);
        }
    }

    fn set_texel(&mut self, texel: u32, x: u16, y: u16) {
        let base = texel as usize * 2;
        self.glyph_data[base] = x;
        self.glyph_data[base + 1] = y;
    }

    fn write_grid(&mut self, grid_pos: (u32, u32), grid: &VGrid) {
        for cy in 0..grid.height {
            for cx in 0..grid.width {
                let cell = grid.cell(cx, cy);
                let atlas_x = grid_pos.0 as usize + cx;
                let atlas_y = grid_pos.1 as usize + cy;
                let pixel = (atlas_y * GRID_ATLAS_SIZE as usize + atlas_x) * 4;
                self.grid_atlas[pixel..pixel + MAX_CURVES_PER_CELL].copy_from_slice(&cell.slots);
            }
        }
    }
}

impl Default for AtlasGroup {
    fn default() -> AtlasGroup {
        AtlasGroup::new()
    }
}

/// Encodes one glyph-space coordinate as `round(coord * 65535 / axisSize)`, per axis.
fn encode_point(point: Vec2, glyph_size: Vec2) -> (u16, u16) {
    (encode_coord(point.x, glyph_size.x), encode_coord(point.y, glyph_size.y))
}

fn encode_coord(value: f32, axis_size: f32) -> u16 {
    let normalized = (value * u16::MAX as f32 / axis_size).round();
    normalized.clamp(0.0, u16::MAX as f32) as u16
}

/// Maintains the ordered sequence of atlas groups a font's glyphs are packed into,
/// opening a new one whenever the current one reports itself full.
pub struct AtlasPacker {
    groups: Vec<AtlasGroup>,
}

impl AtlasPacker {
    pub fn new() -> AtlasPacker {
        AtlasPacker { groups: vec![AtlasGroup::new()] }
    }

    pub fn groups(&self) -> &[AtlasGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [AtlasGroup] {
        &mut self.groups
    }

    /// Packs one glyph, opening a new atlas group transparently if the current one
    /// is full. Returns the group index alongside the glyph's location within it.
    pub fn insert(
        &mut self,
        curves: &[Bezier2],
        grid: &VGrid,
        glyph_size: Vec2,
    ) -> Result<(usize, GlyphLocation), GlyphBuildError> {
        loop {
            let index = self.groups.len() - 1;
            match self.groups[index].try_insert(curves, grid, glyph_size)? {
                InsertOutcome::Placed(location) => return Ok((index, location)),
                InsertOutcome::GroupFull => {
                    log::debug!("atlas group {} full, opening a new one", index);
                    self.groups.push(AtlasGroup::new());
                }
            }
        }
    }
}

impl Default for AtlasPacker {
    fn default() -> AtlasPacker {
        AtlasPacker::new()
    }
}

/// The bit-exact layout the fragment shader consumes (§6.3). Nothing here is
/// executed on the GPU; these are the CPU-side encode/decode functions that must
/// agree with it, kept next to the packer so the two never drift apart.
pub mod contract {
    /// Packs the per-vertex attribute: the glyph's header offset (in texels) and
    /// which of the em-box's four corners this vertex represents.
    pub fn encode_vertex_attribute(glyph_data_offset: u32, norm_x: bool, norm_y: bool) -> u32 {
        (glyph_data_offset << 2) | ((norm_x as u32) << 1) | norm_y as u32
    }

    pub fn decode_vertex_attribute(attribute: u32) -> (u32, bool, bool) {
        let glyph_data_offset = attribute >> 2;
        let norm_x = (attribute >> 1) & 1 != 0;
        let norm_y = attribute & 1 != 0;
        (glyph_data_offset, norm_x, norm_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid;

    fn rectangle_glyph(size: f32) -> (Vec<Bezier2>, VGrid) {
        let curves = vec![
            Bezier2::line(Vec2::new(0.0, 0.0), Vec2::new(size, 0.0)),
            Bezier2::line(Vec2::new(size, 0.0), Vec2::new(size, size)),
            Bezier2::line(Vec2::new(size, size), Vec2::new(0.0, size)),
            Bezier2::line(Vec2::new(0.0, size), Vec2::new(0.0, 0.0)),
        ];
        let grid = grid::build(&curves, Vec2::splat(size), GRID_SIZE, GRID_SIZE).unwrap();
        (curves, grid)
    }

    #[test]
    fn header_and_curve_round_trip_through_quantization() {
        let (curves, grid) = rectangle_glyph(1024.0);
        let mut group = AtlasGroup::new();
        let location = match group.try_insert(&curves, &grid, Vec2::splat(1024.0)).unwrap() {
            InsertOutcome::Placed(loc) => loc,
            InsertOutcome::GroupFull => panic!("a fresh group cannot be full"),
        };

        let bytes = group.glyph_data_bytes();
        let word = |i: u32| -> u16 {
            let base = i as usize * 2;
            u16::from_le_bytes([bytes[base], bytes[base + 1]])
        };
        assert_eq!(word(location.glyph_data_offset * 2), location.grid_pos.0 as u16);
        assert_eq!(word(location.glyph_data_offset * 2 + 1), location.grid_pos.1 as u16);
        assert_eq!(word(location.glyph_data_offset * 2 + 2), GRID_SIZE as u16);
        assert_eq!(word(location.glyph_data_offset * 2 + 3), GRID_SIZE as u16);
    }

    #[test]
    fn midpoint_encoding_rounds_to_nearest_texel() {
        // Encoding (w/2, h) of a 1024x2048 glyph rounds to (32768, 65535).
        let (x, y) = encode_point(Vec2::new(512.0, 2048.0), Vec2::new(1024.0, 2048.0));
        assert_eq!((x, y), (32768, 65535));
    }

    #[test]
    fn insert_is_atomic_on_failure() {
        // A glyph whose curve count alone would overflow the atlas even empty. The
        // curve-count check is independent of grid content, so an all-empty grid
        // (rather than one a real glyph with this many curves could produce, which
        // would itself overflow a cell) is enough to isolate the atlas-side budget.
        let huge_curve_count = (BEZIER_ATLAS_TEXELS as usize - 2) / 3 + 1;
        let curves = vec![Bezier2::line(Vec2::zero(), Vec2::new(1.0, 1.0)); huge_curve_count];
        let grid = crate::grid::VGrid {
            width: GRID_SIZE,
            height: GRID_SIZE,
            cells: vec![crate::grid::Cell::default(); GRID_SIZE * GRID_SIZE],
        };

        let mut group = AtlasGroup::new();
        let before_offset = group.glyph_data_offset;
        let before_grid_pos = group.next_grid_pos;

        let err = group.try_insert(&curves, &grid, Vec2::splat(100_000.0)).unwrap_err();
        assert!(matches!(err, GlyphBuildError::BezierBudgetExceeded { .. }));
        assert_eq!(group.glyph_data_offset, before_offset);
        assert_eq!(group.next_grid_pos, before_grid_pos);
    }

    #[test]
    fn atlas_group_rolls_over_at_capacity() {
        let (curves, grid) = rectangle_glyph(1000.0);
        let mut packer = AtlasPacker::new();

        // GRID_ATLAS_SIZE / GRID_SIZE = 256 / 20 = 12 columns, 12 full rows fit
        // (12*12 = 144 glyphs with room to spare before the 165th in the original
        // scenario's 1024-wide atlas; here we roll over a 256-wide one instead, so
        // we only assert the rollover happens and lands at a fresh (0, 0)).
        let per_group_capacity = (GRID_ATLAS_SIZE / GRID_SIZE as u32).pow(2) as usize;
        for _ in 0..per_group_capacity {
            packer.insert(&curves, &grid, Vec2::splat(1000.0)).unwrap();
        }
        assert_eq!(packer.groups().len(), 1);

        let (group_index, location) = packer.insert(&curves, &grid, Vec2::splat(1000.0)).unwrap();
        assert_eq!(group_index, 1);
        assert_eq!(location.grid_pos, (0, 0));
        assert_eq!(packer.groups().len(), 2);
    }

    #[test]
    fn vertex_attribute_round_trips() {
        let packed = contract::encode_vertex_attribute(12345, true, false);
        assert_eq!(contract::decode_vertex_attribute(packed), (12345, true, false));
    }
}
