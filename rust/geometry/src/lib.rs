// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MeshLine Geometry
//!
//! GPU-ready buffers for two kinds of primitives:
//!
//! - **Ribbons**: screen-space widened polylines. [`RibbonBuilder`] expands
//!   each point into a vertex pair carrying its neighbours, side sign, width
//!   and arc-length parameter, and supports sliding-window updates through
//!   [`RibbonBuilder::advance`].
//! - **Text**: bitmap-font labels. [`TextGeometry`] lays out a string with a
//!   [`BitmapFont`](meshline_core::BitmapFont) and emits one textured quad per
//!   visible glyph.
//!
//! All buffers are flat `f32`/`u32` arrays tagged with a version counter so a
//! renderer can upload only what changed.

pub mod attribute;
pub mod bounds;
pub mod error;
pub mod raycast;
pub mod ribbon;
pub mod text;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use attribute::{names, Attribute, BufferAttribute, IndexBuffer};
pub use bounds::{BoundingBox, BoundingSphere};
pub use error::{Error, Result};
pub use raycast::{Ray, Raycaster, RibbonHit};
pub use ribbon::{RibbonBuilder, RibbonMesh, WidthFn};
pub use text::{
    build_geometry, cell_uv, layout, Align, CellUv, GlyphLayout, LayoutOptions, LineSpan,
    PlacedGlyph, TextBuffers, TextGeometry, TextUpdate, WrapMode,
};
