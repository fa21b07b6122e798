// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # MeshLine Core
//!
//! Input models shared by the MeshLine geometry builders.
//!
//! ## Overview
//!
//! - **Point sources**: polylines arrive either as structured points or as a
//!   flat `[x, y, z, x, y, z, ...]` array. [`PointSource`] accepts both and
//!   canonicalises them into one `Vec<Point3<f32>>`.
//! - **Bitmap fonts**: [`BitmapFont`] is a BMFont descriptor (the JSON flavour
//!   written by `msdf-bmfont` and friends) with hashed glyph and kerning
//!   lookup.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use meshline_core::{BitmapFont, PointSource};
//!
//! let source = PointSource::from_json(&serde_json::json!([0, 0, 0, 1, 0, 0]))?;
//! let points = source.to_points()?;
//! assert_eq!(points.len(), 2);
//!
//! let font = BitmapFont::from_json(&std::fs::read_to_string("OpenSans.json")?)?;
//! let a = font.glyph('A' as u32).unwrap();
//! println!("A advances {}", a.xadvance);
//! ```

pub mod error;
pub mod font;
pub mod point;

// Re-export nalgebra types for convenience
pub use nalgebra::Point3;

pub use error::{Error, Result};
pub use font::{BitmapFont, DistanceField, FontCommon, FontInfo, Glyph, Kerning};
pub use point::PointSource;
