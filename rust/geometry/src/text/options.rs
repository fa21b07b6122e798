// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text layout options and partial updates

use meshline_core::BitmapFont;
use std::sync::Arc;

/// Horizontal alignment of each line within the widest line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// How lines are broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Break at the last whitespace that fits, or inside a word if none does
    #[default]
    Greedy,
    /// Break only at explicit newlines, keeping all whitespace
    Pre,
    /// Like `Greedy` but lines are never width-limited
    NoWrap,
}

/// Layout configuration. All lengths are in font pixels unless noted.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Output size in world units; quads are scaled by `size / info.size`
    pub size: Option<f32>,
    /// Maximum line width; lines are not wrapped when unset
    pub width: Option<f32>,
    pub mode: WrapMode,
    pub align: Align,
    /// Extra advance added after every glyph
    pub letter_spacing: f32,
    /// Overrides the font's `common.lineHeight`
    pub line_height: Option<f32>,
    /// Tab stop spacing, in multiples of the space advance
    pub tab_size: f32,
    /// Flip V so that atlas row 0 maps to `v = 1`
    pub flip_y: bool,
    /// Emit the per-vertex `page` attribute
    pub multipage: bool,
    /// First character (by codepoint index) to lay out
    pub start: usize,
    /// One past the last character to lay out
    pub end: Option<usize>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            size: None,
            width: None,
            mode: WrapMode::Greedy,
            align: Align::Left,
            letter_spacing: 0.0,
            line_height: None,
            tab_size: 4.0,
            flip_y: true,
            multipage: false,
            start: 0,
            end: None,
        }
    }
}

/// Partial update for a [`TextGeometry`](super::TextGeometry).
///
/// Fields left as `None` keep their previous value. The optional layout
/// settings (`size`, `width`, `line_height`, `end`) use `Some(None)` to
/// return to the default, see the `clear_*` setters.
#[derive(Debug, Clone, Default)]
pub struct TextUpdate {
    pub font: Option<Arc<BitmapFont>>,
    pub text: Option<String>,
    pub size: Option<Option<f32>>,
    pub width: Option<Option<f32>>,
    pub mode: Option<WrapMode>,
    pub align: Option<Align>,
    pub letter_spacing: Option<f32>,
    pub line_height: Option<Option<f32>>,
    pub tab_size: Option<f32>,
    pub flip_y: Option<bool>,
    pub multipage: Option<bool>,
    pub start: Option<usize>,
    pub end: Option<Option<usize>>,
}

impl TextUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font(mut self, font: Arc<BitmapFont>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = Some(Some(size));
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(Some(width));
        self
    }

    pub fn mode(mut self, mode: WrapMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = Some(letter_spacing);
        self
    }

    pub fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = Some(Some(line_height));
        self
    }

    pub fn tab_size(mut self, tab_size: f32) -> Self {
        self.tab_size = Some(tab_size);
        self
    }

    pub fn flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = Some(flip_y);
        self
    }

    pub fn multipage(mut self, multipage: bool) -> Self {
        self.multipage = Some(multipage);
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: usize) -> Self {
        self.end = Some(Some(end));
        self
    }

    /// Go back to font units
    pub fn clear_size(mut self) -> Self {
        self.size = Some(None);
        self
    }

    /// Stop wrapping at a fixed width
    pub fn clear_width(mut self) -> Self {
        self.width = Some(None);
        self
    }

    /// Use the font's own line height
    pub fn clear_line_height(mut self) -> Self {
        self.line_height = Some(None);
        self
    }

    /// Lay out through the end of the text
    pub fn clear_end(mut self) -> Self {
        self.end = Some(None);
        self
    }

    /// Apply the layout fields of this update over `options`
    pub fn merge_into(&self, options: &mut LayoutOptions) {
        if let Some(size) = self.size {
            options.size = size;
        }
        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(mode) = self.mode {
            options.mode = mode;
        }
        if let Some(align) = self.align {
            options.align = align;
        }
        if let Some(letter_spacing) = self.letter_spacing {
            options.letter_spacing = letter_spacing;
        }
        if let Some(line_height) = self.line_height {
            options.line_height = line_height;
        }
        if let Some(tab_size) = self.tab_size {
            options.tab_size = tab_size;
        }
        if let Some(flip_y) = self.flip_y {
            options.flip_y = flip_y;
        }
        if let Some(multipage) = self.multipage {
            options.multipage = multipage;
        }
        if let Some(start) = self.start {
            options.start = start;
        }
        if let Some(end) = self.end {
            options.end = end;
        }
    }
}
