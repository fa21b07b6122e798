// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Glyph placement
//!
//! Lines run downwards from `y = -height` in font pixels, so the last line's
//! baseline sits at `y = -descender` and text grows up from the origin once
//! the caller flips Y.

use super::options::{Align, LayoutOptions};
use super::wrap::{self, LineSpan};
use meshline_core::{BitmapFont, Glyph};

const TAB: u32 = 9;
const SPACE: u32 = 32;

/// A glyph positioned on a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    /// Codepoint index in the source text
    pub index: usize,
    /// Zero-based line number
    pub line: usize,
    /// Pen position, before the glyph's own offsets
    pub position: [f32; 2],
    pub glyph: Glyph,
}

/// Result of laying out a string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphLayout {
    /// Every glyph the font could resolve, visible or not
    pub glyphs: Vec<PlacedGlyph>,
    /// Widest line, or the requested width if larger
    pub width: f32,
    pub height: f32,
    pub ascender: f32,
    pub descender: f32,
    pub baseline: f32,
    pub cap_height: f32,
    pub x_height: f32,
    pub line_height: f32,
    pub lines_total: usize,
}

impl GlyphLayout {
    /// Glyphs whose atlas cell covers any pixels
    pub fn visible_glyphs(&self) -> impl Iterator<Item = &PlacedGlyph> + '_ {
        self.glyphs.iter().filter(|g| g.glyph.is_visible())
    }
}

/// Glyph resolution and pen advance rules shared by measuring and placing
struct Shaper<'a> {
    font: &'a BitmapFont,
    letter_spacing: f32,
    space: Option<Glyph>,
    tab: Option<Glyph>,
    tab_width: f32,
}

impl<'a> Shaper<'a> {
    fn new(font: &'a BitmapFont, options: &LayoutOptions) -> Self {
        // Space falls back to the em glyph's advance, then to any glyph
        let space = font
            .glyph(SPACE)
            .or_else(|| font.m_glyph())
            .or_else(|| font.chars.first())
            .map(|g| Glyph {
                id: SPACE,
                ..blank(g)
            });
        let tab_width = space.map_or(0.0, |s| s.xadvance * options.tab_size);
        let tab = font.glyph(TAB).copied().or_else(|| {
            space.map(|s| Glyph {
                id: TAB,
                xadvance: tab_width,
                ..s
            })
        });

        Self {
            font,
            letter_spacing: options.letter_spacing,
            space,
            tab,
            tab_width,
        }
    }

    fn glyph(&self, ch: char) -> Option<Glyph> {
        let id = ch as u32;
        match self.font.glyph(id) {
            Some(glyph) => Some(*glyph),
            None if id == TAB => self.tab,
            None if id == SPACE => self.space,
            None => None,
        }
    }

    #[inline]
    fn kerning(&self, last: Option<&Glyph>, glyph: &Glyph) -> f32 {
        last.map_or(0.0, |l| self.font.kerning(l.id, glyph.id))
    }

    /// Pen position after `glyph`; tabs snap to the next tab stop
    #[inline]
    fn advance(&self, pen: f32, glyph: &Glyph) -> f32 {
        if glyph.id == TAB && self.tab_width > 0.0 {
            ((pen / self.tab_width).floor() + 1.0) * self.tab_width
        } else {
            pen + glyph.xadvance + self.letter_spacing
        }
    }

    /// How many of `chars[start..end]` fit in `width`, and their extent
    fn measure(&self, chars: &[char], start: usize, end: usize, width: f32) -> LineSpan {
        if !self.font.has_glyphs() {
            return LineSpan {
                start,
                end: start,
                width: 0.0,
            };
        }

        let end = end.min(chars.len());
        let mut pen = 0.0f32;
        let mut extent = 0.0f32;
        let mut count = 0;
        let mut last: Option<Glyph> = None;

        for &ch in chars.iter().take(end).skip(start) {
            if let Some(glyph) = self.glyph(ch) {
                pen += self.kerning(last.as_ref(), &glyph);
                let next_pen = self.advance(pen, &glyph);
                let next_extent = pen + glyph.width;
                if next_extent >= width || next_pen >= width {
                    break;
                }
                pen = next_pen;
                extent = next_extent;
                last = Some(glyph);
            }
            count += 1;
        }

        if let Some(last) = last {
            extent += last.xoffset;
        }

        LineSpan {
            start,
            end: start + count,
            width: extent,
        }
    }
}

fn blank(glyph: &Glyph) -> Glyph {
    Glyph {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
        xoffset: 0.0,
        yoffset: 0.0,
        ..*glyph
    }
}

/// Lay out `text` with `font`.
///
/// Characters the font cannot resolve are skipped but still count towards
/// glyph indices. Alignment is relative to [`GlyphLayout::width`].
pub fn layout(font: &BitmapFont, text: &str, options: &LayoutOptions) -> GlyphLayout {
    let chars: Vec<char> = text.chars().collect();
    let shaper = Shaper::new(font, options);

    let lines = wrap::wrap(
        &chars,
        options.start,
        options.end,
        options.width,
        options.mode,
        |start, end, width| shaper.measure(&chars, start, end, width),
    );

    let min_width = options.width.unwrap_or(0.0);
    let max_line_width = lines.iter().fold(min_width, |w, line| w.max(line.width));

    let line_height = options.line_height.unwrap_or(font.common.line_height);
    let baseline = font.common.base;
    let descender = line_height - baseline;
    let x_height = font.x_height();
    let height = if lines.is_empty() {
        0.0
    } else {
        line_height * lines.len() as f32 - descender
    };

    let mut glyphs = Vec::with_capacity(chars.len());
    let mut y = -height;

    for (line_index, line) in lines.iter().enumerate() {
        let first = glyphs.len();
        let mut pen = 0.0f32;
        let mut last: Option<Glyph> = None;

        for i in line.start..line.end {
            let Some(glyph) = shaper.glyph(chars[i]) else {
                continue;
            };
            pen += shaper.kerning(last.as_ref(), &glyph);
            glyphs.push(PlacedGlyph {
                index: i,
                line: line_index,
                position: [pen, y],
                glyph,
            });
            pen = shaper.advance(pen, &glyph);
            last = Some(glyph);
        }

        let offset = match options.align {
            Align::Left => 0.0,
            Align::Center => (max_line_width - line.width) / 2.0,
            Align::Right => max_line_width - line.width,
        };
        if offset != 0.0 {
            for placed in &mut glyphs[first..] {
                placed.position[0] += offset;
            }
        }

        y += line_height;
    }

    GlyphLayout {
        glyphs,
        width: max_line_width,
        height,
        ascender: line_height - descender - x_height,
        descender,
        baseline,
        cap_height: font.cap_height(),
        x_height,
        line_height,
        lines_total: lines.len(),
    }
}
