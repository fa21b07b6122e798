// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bitmap-font text geometry
//!
//! Two stages: [`layout`] places glyphs from a [`BitmapFont`] on lines
//! (wrapping, kerning, tab stops, alignment), then [`build_geometry`] turns
//! the visible glyphs into one textured quad each. [`TextGeometry`] owns the
//! resulting buffers and reruns both stages on every [`TextGeometry::update`].
//!
//! [`BitmapFont`]: meshline_core::BitmapFont

pub mod geometry;
pub mod layout;
pub mod options;
pub mod wrap;

pub use geometry::{build_geometry, cell_uv, CellUv, TextBuffers, TextGeometry};
pub use layout::{layout, GlyphLayout, PlacedGlyph};
pub use options::{Align, LayoutOptions, TextUpdate, WrapMode};
pub use wrap::LineSpan;
