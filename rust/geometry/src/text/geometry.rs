// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Quad buffers for laid-out text

use super::layout::{layout, GlyphLayout, PlacedGlyph};
use super::options::{LayoutOptions, TextUpdate};
use crate::attribute::{names, Attribute, IndexBuffer};
use crate::bounds::{BoundingBox, BoundingSphere};
use crate::error::{Error, Result};
use meshline_core::{BitmapFont, Glyph};
use std::sync::Arc;

/// Texture coordinates of a glyph cell's corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellUv {
    pub top_left: [f32; 2],
    pub bottom_right: [f32; 2],
}

/// Normalised atlas coordinates of `glyph`'s cell.
///
/// With `flip_y` the atlas is treated as stored bottom-up, so row 0 maps to
/// `v = 1`.
pub fn cell_uv(glyph: &Glyph, tex_width: f32, tex_height: f32, flip_y: bool) -> CellUv {
    let u0 = glyph.x / tex_width;
    let u1 = (glyph.x + glyph.width) / tex_width;
    let (v_top, v_bottom) = if flip_y {
        (
            (tex_height - glyph.y) / tex_height,
            (tex_height - glyph.y - glyph.height) / tex_height,
        )
    } else {
        (glyph.y / tex_height, (glyph.y + glyph.height) / tex_height)
    };
    CellUv {
        top_left: [u0, v_top],
        bottom_right: [u1, v_bottom],
    }
}

/// Raw per-vertex data for a run of glyph quads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBuffers {
    /// Two floats per vertex, four vertices per glyph
    pub positions: Vec<f32>,
    pub uvs: Vec<f32>,
    /// Atlas page per vertex, present only for multipage output
    pub pages: Option<Vec<f32>>,
    /// Six indices per glyph
    pub indices: Vec<u32>,
}

/// Emit one quad per glyph in `glyphs`.
///
/// Vertices go bottom-left, top-left, top-right, bottom-right in layout
/// space, wound as `(0, 1, 2)` and `(0, 2, 3)`.
pub fn build_geometry(glyphs: &[PlacedGlyph], font: &BitmapFont, options: &LayoutOptions) -> TextBuffers {
    let scale = match options.size {
        Some(size) if font.info.size > 0.0 => size / font.info.size,
        _ => 1.0,
    };
    let tex_width = font.common.scale_w;
    let tex_height = font.common.scale_h;

    let mut buffers = TextBuffers {
        positions: Vec::with_capacity(glyphs.len() * 8),
        uvs: Vec::with_capacity(glyphs.len() * 8),
        pages: options.multipage.then(|| Vec::with_capacity(glyphs.len() * 4)),
        indices: Vec::with_capacity(glyphs.len() * 6),
    };

    for (i, placed) in glyphs.iter().enumerate() {
        let glyph = &placed.glyph;
        let x = placed.position[0] + glyph.xoffset;
        let y = placed.position[1] + glyph.yoffset;
        let w = glyph.width;
        let h = glyph.height;

        buffers.positions.extend_from_slice(&[
            x * scale,
            y * scale,
            x * scale,
            (y + h) * scale,
            (x + w) * scale,
            (y + h) * scale,
            (x + w) * scale,
            y * scale,
        ]);

        let uv = cell_uv(glyph, tex_width, tex_height, options.flip_y);
        let [u0, v1] = uv.top_left;
        let [u1, v0] = uv.bottom_right;
        buffers.uvs.extend_from_slice(&[u0, v1, u0, v0, u1, v0, u1, v1]);

        if let Some(pages) = buffers.pages.as_mut() {
            pages.extend_from_slice(&[glyph.page as f32; 4]);
        }

        let j = (i * 4) as u32;
        buffers.indices.extend_from_slice(&[j, j + 1, j + 2, j, j + 2, j + 3]);
    }

    buffers
}

/// Text mesh that re-lays itself out on every [`update`](Self::update).
///
/// Holds a shared reference to its font; the font itself is never modified.
#[derive(Debug)]
pub struct TextGeometry {
    font: Option<Arc<BitmapFont>>,
    text: String,
    options: LayoutOptions,
    layout: GlyphLayout,
    visible_glyphs: Vec<PlacedGlyph>,
    position: Attribute,
    uv: Attribute,
    page: Option<Attribute>,
    index: IndexBuffer,
    bounding_box: BoundingBox,
    bounding_sphere: BoundingSphere,
}

impl TextGeometry {
    /// Build text geometry from an initial set of options.
    ///
    /// Fails with [`Error::MissingFont`] when no font is given.
    pub fn new(initial: TextUpdate) -> Result<Self> {
        let mut geometry = Self {
            font: None,
            text: String::new(),
            options: LayoutOptions::default(),
            layout: GlyphLayout::default(),
            visible_glyphs: Vec::new(),
            position: Attribute::new(names::POSITION, 2),
            uv: Attribute::new(names::UV, 2),
            page: None,
            index: IndexBuffer::new(names::INDEX, 1),
            bounding_box: BoundingBox::empty(),
            bounding_sphere: BoundingSphere::zero(),
        };
        geometry.update(initial)?;
        Ok(geometry)
    }

    /// Merge `update` over the current options and rebuild all buffers.
    ///
    /// On error nothing is changed.
    pub fn update(&mut self, update: TextUpdate) -> Result<()> {
        let mut options = self.options.clone();
        update.merge_into(&mut options);

        let font = update
            .font
            .or_else(|| self.font.clone())
            .ok_or(Error::MissingFont)?;
        let text = update.text.unwrap_or_else(|| std::mem::take(&mut self.text));

        let layout = layout(&font, &text, &options);
        let visible: Vec<PlacedGlyph> = layout.visible_glyphs().copied().collect();
        let buffers = build_geometry(&visible, &font, &options);

        self.position.write(&buffers.positions);
        self.uv.write(&buffers.uvs);
        self.index.write(&buffers.indices);
        self.page = match (buffers.pages, self.page.take()) {
            (Some(pages), Some(mut attr)) => {
                attr.write(&pages);
                Some(attr)
            }
            (Some(pages), None) => Some(Attribute::from_vec(names::PAGE, 1, pages)),
            (None, _) => None,
        };

        self.bounding_box = BoundingBox::from_positions(self.position.as_slice(), 2);
        self.bounding_sphere = BoundingSphere::from_planar_positions(self.position.as_slice());
        if let Err(err) = self.bounding_sphere.validate() {
            tracing::warn!(error = %err, "Text position buffer is likely to contain NaN values");
        }

        tracing::debug!(
            chars = text.chars().count(),
            glyphs = visible.len(),
            lines = layout.lines_total,
            "Rebuilt text geometry"
        );

        self.font = Some(font);
        self.text = text;
        self.options = options;
        self.layout = layout;
        self.visible_glyphs = visible;
        Ok(())
    }

    #[inline]
    pub fn font(&self) -> Option<&Arc<BitmapFont>> {
        self.font.as_ref()
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Layout metrics and every placed glyph
    #[inline]
    pub fn layout(&self) -> &GlyphLayout {
        &self.layout
    }

    /// Glyphs that produced a quad, in buffer order
    #[inline]
    pub fn visible_glyphs(&self) -> &[PlacedGlyph] {
        &self.visible_glyphs
    }

    #[inline]
    pub fn position(&self) -> &Attribute {
        &self.position
    }

    #[inline]
    pub fn uv(&self) -> &Attribute {
        &self.uv
    }

    /// Per-vertex atlas page, only present with `multipage`
    #[inline]
    pub fn page(&self) -> Option<&Attribute> {
        self.page.as_ref()
    }

    #[inline]
    pub fn index(&self) -> &IndexBuffer {
        &self.index
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.visible_glyphs.len()
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    #[inline]
    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.bounding_sphere
    }

    /// Report a bounding sphere whose radius is not finite
    pub fn validate_bounds(&self) -> Result<()> {
        self.bounding_sphere.validate()
    }

    pub fn mark_uploaded(&mut self) {
        self.position.mark_uploaded();
        self.uv.mark_uploaded();
        self.index.mark_uploaded();
        if let Some(page) = self.page.as_mut() {
            page.mark_uploaded();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::options::Align;
    use approx::assert_relative_eq;
    use meshline_core::FontCommon;

    fn cell(id: char, x: f32, page: u32) -> Glyph {
        Glyph {
            id: id as u32,
            x,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            xoffset: 1.0,
            yoffset: 2.0,
            xadvance: 12.0,
            page,
            chnl: 15,
        }
    }

    fn font() -> Arc<BitmapFont> {
        let mut font = BitmapFont::new(
            vec![
                cell('a', 0.0, 0),
                cell('b', 10.0, 1),
                Glyph {
                    width: 0.0,
                    height: 0.0,
                    xadvance: 6.0,
                    ..cell(' ', 0.0, 0)
                },
            ],
            FontCommon {
                line_height: 20.0,
                base: 16.0,
                scale_w: 100.0,
                scale_h: 100.0,
                pages: 2,
            },
            vec![],
        )
        .unwrap();
        font.info.size = 20.0;
        Arc::new(font)
    }

    #[test]
    fn test_cell_uv_flipped() {
        let glyph = Glyph {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            ..cell('a', 0.0, 0)
        };
        let uv = cell_uv(&glyph, 100.0, 100.0, true);
        assert_relative_eq!(uv.top_left[0], 0.0);
        assert_relative_eq!(uv.top_left[1], 1.0);
        assert_relative_eq!(uv.bottom_right[0], 0.1);
        assert_relative_eq!(uv.bottom_right[1], 0.9);
    }

    #[test]
    fn test_cell_uv_unflipped() {
        let uv = cell_uv(&cell('a', 20.0, 0), 100.0, 100.0, false);
        assert_eq!(uv.top_left, [0.2, 0.0]);
        assert_relative_eq!(uv.bottom_right[0], 0.3);
        assert_relative_eq!(uv.bottom_right[1], 0.1);
    }

    #[test]
    fn test_quad_layout() {
        let geometry = TextGeometry::new(TextUpdate::new().font(font()).text("a")).unwrap();
        // Pen at (0, -16), offsets (1, 2)
        assert_eq!(
            geometry.position().as_slice(),
            &[1.0, -14.0, 1.0, -4.0, 11.0, -4.0, 11.0, -14.0]
        );
        assert_eq!(geometry.index().as_slice(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(geometry.uv().as_slice(), &[0.0, 1.0, 0.0, 0.9, 0.1, 0.9, 0.1, 1.0]);
        assert!(geometry.page().is_none());
    }

    #[test]
    fn test_invisible_glyphs_emit_no_quads() {
        let geometry = TextGeometry::new(TextUpdate::new().font(font()).text("a b")).unwrap();
        assert_eq!(geometry.layout().glyphs.len(), 3);
        assert_eq!(geometry.quad_count(), 2);
        assert_eq!(geometry.position().count(), 8);
        assert_eq!(geometry.index().len(), 12);
        assert_eq!(&geometry.index().as_slice()[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_multipage_pages() {
        let geometry = TextGeometry::new(
            TextUpdate::new().font(font()).text("ab").multipage(true),
        )
        .unwrap();
        let page = geometry.page().expect("page attribute");
        assert_eq!(page.as_slice(), &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_empty_text_has_no_area() {
        let geometry = TextGeometry::new(TextUpdate::new().font(font()).text("")).unwrap();
        assert_eq!(geometry.quad_count(), 0);
        assert!(geometry.position().is_empty());
        assert!(geometry.bounding_box().is_empty());
        assert_relative_eq!(geometry.bounding_box().area_2d(), 0.0);
        assert_relative_eq!(geometry.bounding_sphere().radius, 0.0);
        assert!(geometry.validate_bounds().is_ok());
    }

    #[test]
    fn test_missing_font() {
        let err = TextGeometry::new(TextUpdate::new().text("a")).unwrap_err();
        assert!(matches!(err, Error::MissingFont));
    }

    #[test]
    fn test_update_merges_previous_options() {
        let mut geometry = TextGeometry::new(
            TextUpdate::new().font(font()).text("ab").width(100.0),
        )
        .unwrap();
        let before = geometry.position().version();

        geometry.update(TextUpdate::new().align(Align::Right)).unwrap();
        assert_eq!(geometry.text(), "ab");
        assert_eq!(geometry.options().width, Some(100.0));
        assert_eq!(geometry.options().align, Align::Right);
        assert!(geometry.position().version() > before);
        // Line extent 12 + 10 + 1 = 23, pushed to the right edge
        assert_relative_eq!(geometry.visible_glyphs()[0].position[0], 77.0);
    }

    #[test]
    fn test_size_scales_positions() {
        let geometry = TextGeometry::new(TextUpdate::new().font(font()).text("a").size(10.0)).unwrap();
        assert_eq!(
            geometry.position().as_slice(),
            &[0.5, -7.0, 0.5, -2.0, 5.5, -2.0, 5.5, -7.0]
        );
    }

    #[test]
    fn test_bounds() {
        let geometry = TextGeometry::new(TextUpdate::new().font(font()).text("ab")).unwrap();
        let bbox = geometry.bounding_box();
        assert_relative_eq!(bbox.min.x, 1.0);
        assert_relative_eq!(bbox.max.x, 23.0);
        assert_relative_eq!(bbox.min.y, -14.0);
        assert_relative_eq!(bbox.max.y, -4.0);
        let sphere = geometry.bounding_sphere();
        assert_relative_eq!(sphere.center.x, 12.0);
        assert_relative_eq!(sphere.radius, (22.0f32 * 22.0 + 100.0).sqrt() / 2.0);
    }

    #[test]
    fn test_nan_metrics_are_reported() {
        let mut font = (*font()).clone();
        font.chars[0].xoffset = f32::NAN;
        let font = BitmapFont::new(font.chars, font.common, vec![]).unwrap();
        let geometry = TextGeometry::new(TextUpdate::new().font(Arc::new(font)).text("a")).unwrap();
        assert!(matches!(
            geometry.validate_bounds(),
            Err(Error::DegenerateGeometry { .. })
        ));
    }
}
