// Copyright © 2026 the Contributors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Resolution-independent glyph rendering by analytic evaluation of vector outlines.
//!
//! Glyphs are never rasterized to a bitmap. Instead each glyph's quadratic Bézier
//! outline is uploaded to the GPU, indexed by a small fixed-size grid of cells, and a
//! fragment shader estimates per-pixel coverage directly against the curves touching
//! that pixel's cell. This crate builds that representation on the CPU: it turns a
//! font's contours into flat quadratics ([`outline`]), indexes them into a [`grid::VGrid`],
//! and packs the result into the two atlases a renderer uploads to the GPU
//! ([`atlas`], [`cache`]).
//!
//! The GPU-side consumer of this data is documented, not implemented, in [`atlas::contract`].

pub mod atlas;
pub mod cache;
pub mod config;
pub mod cubic;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod outline;

pub use atlas::{AtlasGroup, GlyphLocation};
pub use cache::{DegenerateGlyph, GlyphCache, GlyphRecord, ResolvedGlyph};
pub use config::Config;
pub use error::GlyphBuildError;
pub use geometry::{Bezier2, Rect, Vec2};
pub use grid::VGrid;
pub use outline::{Contour, Glyph, GlyphMetrics, OutlinePoint, PointKind};
