// Copyright © 2026 the Contributors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ties outline extraction, grid building, and atlas packing together behind a
//! single per-glyph-ID cache that never evicts and never revisits a glyph it has
//! already resolved.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::atlas::{AtlasGroup, AtlasPacker};
use crate::config::Config;
use crate::error::GlyphBuildError;
use crate::geometry::Vec2;
use crate::outline::{self, GlyphMetrics, OutlineSource};

/// A glyph that was fully built: it has a grid and a place in the atlas.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedGlyph {
    pub atlas_group: usize,
    pub glyph_data_offset: u32,
    pub grid_pos: (u32, u32),
    pub bearing: Vec2,
    pub advance: f32,
    pub size: Vec2,
}

/// A glyph that has no visible representation in the atlas, either because it has
/// no outline (whitespace) or because building one failed in a way that's local to
/// this glyph. Metrics are still meaningful and safe to lay out with.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DegenerateGlyph {
    pub bearing: Vec2,
    pub advance: f32,
}

/// What the cache remembers for one glyph ID.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphRecord {
    Resolved(ResolvedGlyph),
    Degenerate(DegenerateGlyph),
}

impl GlyphRecord {
    pub fn bearing(&self) -> Vec2 {
        match self {
            GlyphRecord::Resolved(g) => g.bearing,
            GlyphRecord::Degenerate(g) => g.bearing,
        }
    }

    pub fn advance(&self) -> f32 {
        match self {
            GlyphRecord::Resolved(g) => g.advance,
            GlyphRecord::Degenerate(g) => g.advance,
        }
    }
}

/// Builds and remembers one font's glyph representations.
///
/// Once a glyph ID resolves to a record, `get_glyph` never touches the outline
/// source, the grid builder, or the atlas packer for it again — a cache hit is a
/// single hash-map lookup. There is no eviction: glyph representations live for as
/// long as the cache does, matching the single-threaded, suspension-free model a
/// renderer drives this from.
pub struct GlyphCache {
    config: Config,
    packer: AtlasPacker,
    records: HashMap<u32, GlyphRecord>,
}

impl GlyphCache {
    pub fn new(config: Config) -> GlyphCache {
        GlyphCache { config, packer: AtlasPacker::new(), records: HashMap::new() }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn atlas_groups(&self) -> &[AtlasGroup] {
        self.packer.groups()
    }

    pub fn atlas_groups_mut(&mut self) -> &mut [AtlasGroup] {
        self.packer.groups_mut()
    }

    /// Returns `glyph_id`'s record, building and caching it on first lookup.
    ///
    /// An [`GlyphBuildError::OutlineProvider`] failure is propagated and left
    /// uncached, so a later call can retry against a source that may have
    /// recovered. Every other failure is local to this glyph: it is remembered as
    /// a [`GlyphRecord::Degenerate`] so repeated lookups don't repeat the failed
    /// work, and `Ok` is still returned — §7's policy is that a single bad glyph
    /// degrades gracefully rather than failing the whole cache.
    pub fn get_glyph<S: OutlineSource>(
        &mut self,
        source: &S,
        glyph_id: u32,
    ) -> Result<&GlyphRecord, GlyphBuildError> {
        match self.records.entry(glyph_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let record = self.build_glyph(source, glyph_id)?;
                Ok(entry.insert(record))
            }
        }
    }

    fn build_glyph<S: OutlineSource>(
        &mut self,
        source: &S,
        glyph_id: u32,
    ) -> Result<GlyphRecord, GlyphBuildError> {
        let glyph = match outline::extract_glyph(source, glyph_id, &self.config) {
            Ok(glyph) => glyph,
            Err(err) if err.is_degenerate() => {
                log::debug!("glyph {} has no renderable outline: {}", glyph_id, err);
                let metrics = source.glyph_metrics(glyph_id).unwrap_or(GlyphMetrics::default());
                return Ok(GlyphRecord::Degenerate(DegenerateGlyph {
                    bearing: metrics.bearing,
                    advance: metrics.advance,
                }));
            }
            Err(err) => return Err(err),
        };

        let grid_size = self.config.grid_size;
        let grid = match crate::grid::build(&glyph.curves, glyph.size, grid_size, grid_size) {
            Ok(grid) => grid,
            Err(err) => {
                log::warn!("glyph {} grid build failed, storing degenerate: {}", glyph_id, err);
                return Ok(GlyphRecord::Degenerate(DegenerateGlyph {
                    bearing: glyph.bearing,
                    advance: glyph.advance,
                }));
            }
        };

        match self.packer.insert(&glyph.curves, &grid, glyph.size) {
            Ok((atlas_group, location)) => Ok(GlyphRecord::Resolved(ResolvedGlyph {
                atlas_group,
                glyph_data_offset: location.glyph_data_offset,
                grid_pos: location.grid_pos,
                bearing: glyph.bearing,
                advance: glyph.advance,
                size: glyph.size,
            })),
            Err(err) => {
                log::warn!("glyph {} atlas insert failed, storing degenerate: {}", glyph_id, err);
                Ok(GlyphRecord::Degenerate(DegenerateGlyph {
                    bearing: glyph.bearing,
                    advance: glyph.advance,
                }))
            }
        }
    }
}
