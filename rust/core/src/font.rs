// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BMFont descriptors
//!
//! Deserialises the JSON form of the AngelCode BMFont format: per-character
//! atlas cells, shared line metrics and kerning pairs. Lookups by codepoint
//! and by kerning pair are hashed at load time.

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Glyphs probed, in order, for the x-height metric
const X_HEIGHTS: &[char] = &['x', 'e', 'a', 'o', 'n', 's', 'r', 'c', 'u', 'm', 'v', 'w', 'z'];
/// Glyphs probed, in order, for the em-width fallback glyph
const M_WIDTHS: &[char] = &['m', 'w'];
/// Glyphs probed, in order, for the cap-height metric
const CAP_HEIGHTS: &[char] = &['H', 'I', 'N', 'E', 'F', 'K', 'L', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z'];

/// One character's atlas cell and placement metrics, in font pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Unicode codepoint
    pub id: u32,
    /// Cell left edge in the atlas
    #[serde(default)]
    pub x: f32,
    /// Cell top edge in the atlas
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    /// Offset from the pen position to the quad
    #[serde(default)]
    pub xoffset: f32,
    #[serde(default)]
    pub yoffset: f32,
    /// Pen advance after drawing this glyph
    #[serde(default)]
    pub xadvance: f32,
    /// Atlas texture this cell lives on
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub chnl: u32,
}

impl Glyph {
    /// Whether the atlas cell covers any pixels
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.width * self.height > 0.0
    }
}

/// Kerning adjustment between two codepoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kerning {
    pub first: u32,
    pub second: u32,
    pub amount: f32,
}

/// `info` block: how the font was rasterised
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontInfo {
    #[serde(default)]
    pub face: String,
    /// Nominal size the atlas was rendered at
    #[serde(default)]
    pub size: f32,
    #[serde(default)]
    pub padding: Vec<f32>,
    #[serde(default)]
    pub spacing: Vec<f32>,
}

/// `common` block: metrics shared by every line and the atlas dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontCommon {
    pub line_height: f32,
    /// Distance from the top of a line to the baseline
    pub base: f32,
    /// Atlas width in pixels
    pub scale_w: f32,
    /// Atlas height in pixels
    pub scale_h: f32,
    #[serde(default = "default_pages")]
    pub pages: u32,
}

fn default_pages() -> u32 {
    1
}

/// Signed-distance-field parameters written by SDF/MSDF generators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceField {
    pub field_type: String,
    pub distance_range: f32,
}

/// On-disk shape of a BMFont JSON file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FontDescriptor {
    #[serde(default)]
    pages: Vec<String>,
    #[serde(default)]
    chars: Vec<Glyph>,
    #[serde(default)]
    info: FontInfo,
    common: FontCommon,
    #[serde(default)]
    kernings: Vec<Kerning>,
    #[serde(default)]
    distance_field: Option<DistanceField>,
}

/// Bitmap font descriptor with hashed lookups
#[derive(Debug, Clone)]
pub struct BitmapFont {
    /// Atlas texture file names, indexed by glyph `page`
    pub pages: Vec<String>,
    /// Glyphs in descriptor order
    pub chars: Vec<Glyph>,
    pub info: FontInfo,
    pub common: FontCommon,
    pub kernings: Vec<Kerning>,
    pub distance_field: Option<DistanceField>,
    glyph_index: FxHashMap<u32, usize>,
    kerning_index: FxHashMap<(u32, u32), f32>,
}

impl BitmapFont {
    /// Parse a BMFont JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptor: FontDescriptor = serde_json::from_str(json)?;
        Self::from_descriptor(descriptor)
    }

    /// Parse a BMFont JSON document from raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let descriptor: FontDescriptor = serde_json::from_slice(bytes)?;
        Self::from_descriptor(descriptor)
    }

    /// Build from an already decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let descriptor: FontDescriptor = serde_json::from_value(value)?;
        Self::from_descriptor(descriptor)
    }

    /// Build a font directly from its parts
    pub fn new(chars: Vec<Glyph>, common: FontCommon, kernings: Vec<Kerning>) -> Result<Self> {
        Self::from_descriptor(FontDescriptor {
            pages: Vec::new(),
            chars,
            info: FontInfo::default(),
            common,
            kernings,
            distance_field: None,
        })
    }

    fn from_descriptor(descriptor: FontDescriptor) -> Result<Self> {
        let common = descriptor.common;
        if !(common.scale_w > 0.0 && common.scale_h > 0.0) {
            return Err(Error::InvalidFont(format!(
                "atlas dimensions must be positive, got {}x{}",
                common.scale_w, common.scale_h
            )));
        }

        // First occurrence wins for duplicate ids and pairs
        let mut glyph_index = FxHashMap::default();
        for (i, glyph) in descriptor.chars.iter().enumerate() {
            glyph_index.entry(glyph.id).or_insert(i);
        }
        let mut kerning_index = FxHashMap::default();
        for kern in &descriptor.kernings {
            kerning_index.entry((kern.first, kern.second)).or_insert(kern.amount);
        }

        tracing::debug!(
            face = %descriptor.info.face,
            glyphs = descriptor.chars.len(),
            kernings = descriptor.kernings.len(),
            pages = descriptor.pages.len(),
            "Loaded bitmap font"
        );

        Ok(Self {
            pages: descriptor.pages,
            chars: descriptor.chars,
            info: descriptor.info,
            common,
            kernings: descriptor.kernings,
            distance_field: descriptor.distance_field,
            glyph_index,
            kerning_index,
        })
    }

    /// Look up a glyph by codepoint
    #[inline]
    pub fn glyph(&self, id: u32) -> Option<&Glyph> {
        self.glyph_index.get(&id).map(|&i| &self.chars[i])
    }

    /// Kerning adjustment between two codepoints (0 when no pair is listed)
    #[inline]
    pub fn kerning(&self, first: u32, second: u32) -> f32 {
        if self.kerning_index.is_empty() {
            return 0.0;
        }
        self.kerning_index.get(&(first, second)).copied().unwrap_or(0.0)
    }

    /// Whether the font has any glyphs at all
    pub fn has_glyphs(&self) -> bool {
        !self.chars.is_empty()
    }

    /// Height of the first lowercase glyph found among the usual x-height
    /// candidates, or 0.
    pub fn x_height(&self) -> f32 {
        self.first_of(X_HEIGHTS).map(|g| g.height).unwrap_or(0.0)
    }

    /// Height of the first capital found among the usual cap-height
    /// candidates, or 0.
    pub fn cap_height(&self) -> f32 {
        self.first_of(CAP_HEIGHTS).map(|g| g.height).unwrap_or(0.0)
    }

    /// The `m` (or `w`) glyph, used when the font has no space
    pub fn m_glyph(&self) -> Option<&Glyph> {
        self.first_of(M_WIDTHS)
    }

    fn first_of(&self, candidates: &[char]) -> Option<&Glyph> {
        candidates.iter().find_map(|&c| self.glyph(c as u32))
    }
}
