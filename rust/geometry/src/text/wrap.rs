// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line breaking
//!
//! Works on codepoint indices and a caller-supplied measure function, so the
//! same breaker serves any font. `measure(start, end, width)` must return how
//! many characters from `start` fit within `width` (as `LineSpan::end`) and
//! the pixel width they occupy.

use super::options::WrapMode;
use smallvec::SmallVec;

/// Characters `start..end` of the source text forming one line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
    pub width: f32,
}

impl LineSpan {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Most labels fit in a handful of lines
pub type Lines = SmallVec<[LineSpan; 4]>;

/// Break `chars[start..end]` into lines.
///
/// A `width` of zero yields no lines except in [`WrapMode::NoWrap`].
pub fn wrap<M>(
    chars: &[char],
    start: usize,
    end: Option<usize>,
    width: Option<f32>,
    mode: WrapMode,
    mut measure: M,
) -> Lines
where
    M: FnMut(usize, usize, f32) -> LineSpan,
{
    if width == Some(0.0) && mode != WrapMode::NoWrap {
        return Lines::new();
    }

    let width = width.unwrap_or(f32::MAX);
    let end = end.unwrap_or(chars.len()).min(chars.len());
    let start = start.min(end);

    match mode {
        WrapMode::Pre => wrap_pre(chars, start, end, width, &mut measure),
        WrapMode::Greedy => wrap_greedy(chars, start, end, width, &mut measure),
        WrapMode::NoWrap => wrap_greedy(chars, start, end, f32::MAX, &mut measure),
    }
}

fn wrap_pre<M>(chars: &[char], start: usize, end: usize, width: f32, measure: &mut M) -> Lines
where
    M: FnMut(usize, usize, f32) -> LineSpan,
{
    let mut lines = Lines::new();
    let mut line_start = start;
    for i in start..end {
        let newline = chars[i] == '\n';
        if newline || i == end - 1 {
            let line_end = if newline { i } else { i + 1 };
            lines.push(measure(line_start, line_end, width));
            line_start = i + 1;
        }
    }
    lines
}

fn wrap_greedy<M>(chars: &[char], mut start: usize, end: usize, width: f32, measure: &mut M) -> Lines
where
    M: FnMut(usize, usize, f32) -> LineSpan,
{
    let mut lines = Lines::new();

    while start < end {
        let newline = index_of_newline(chars, start, end);

        // Leading whitespace never starts a line
        while start < newline && chars[start].is_whitespace() {
            start += 1;
        }

        let measured = measure(start, newline, width);
        let mut line_end = start + measured.len();
        let mut next_start = line_end + 1;

        if line_end < newline {
            // Back up to the last whitespace that fits
            while line_end > start && !chars[line_end].is_whitespace() {
                line_end -= 1;
            }
            if line_end == start {
                // No whitespace: break inside the word
                if next_start > start + 1 {
                    next_start -= 1;
                }
                line_end = next_start;
            } else {
                next_start = line_end;
                while line_end > start && chars[line_end - 1].is_whitespace() {
                    line_end -= 1;
                }
            }
        }

        if line_end >= start {
            lines.push(measure(start, line_end, width));
        }
        start = next_start;
    }

    lines
}

fn index_of_newline(chars: &[char], start: usize, end: usize) -> usize {
    chars[start..end]
        .iter()
        .position(|&c| c == '\n')
        .map_or(end, |i| start + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Monospace measure: every character is 10 wide
    fn mono(chars: &[char]) -> impl FnMut(usize, usize, f32) -> LineSpan + '_ {
        move |start, end, width| {
            let mut count = 0;
            for _ in start..end.min(chars.len()) {
                if ((count + 1) * 10) as f32 >= width {
                    break;
                }
                count += 1;
            }
            LineSpan {
                start,
                end: start + count,
                width: (count * 10) as f32,
            }
        }
    }

    fn texts(chars: &[char], lines: &Lines) -> Vec<String> {
        lines
            .iter()
            .map(|l| chars[l.start..l.end].iter().collect())
            .collect()
    }

    #[test]
    fn test_greedy_breaks_at_whitespace() {
        let chars: Vec<char> = "hello big world".chars().collect();
        let lines = wrap(&chars, 0, None, Some(95.0), WrapMode::Greedy, mono(&chars));
        assert_eq!(texts(&chars, &lines), vec!["hello big", "world"]);
    }

    #[test]
    fn test_greedy_breaks_long_word() {
        let chars: Vec<char> = "abcdefgh".chars().collect();
        let lines = wrap(&chars, 0, None, Some(35.0), WrapMode::Greedy, mono(&chars));
        assert_eq!(texts(&chars, &lines), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_greedy_honours_newlines() {
        let chars: Vec<char> = "ab\ncd".chars().collect();
        let lines = wrap(&chars, 0, None, None, WrapMode::Greedy, mono(&chars));
        assert_eq!(texts(&chars, &lines), vec!["ab", "cd"]);
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let chars: Vec<char> = "  a b\n c".chars().collect();
        let lines = wrap(&chars, 0, None, None, WrapMode::Pre, mono(&chars));
        assert_eq!(texts(&chars, &lines), vec!["  a b", " c"]);
    }

    #[test]
    fn test_nowrap_ignores_width() {
        let chars: Vec<char> = "one two three".chars().collect();
        let lines = wrap(&chars, 0, None, Some(20.0), WrapMode::NoWrap, mono(&chars));
        assert_eq!(texts(&chars, &lines), vec!["one two three"]);
    }

    #[test]
    fn test_zero_width_yields_nothing() {
        let chars: Vec<char> = "text".chars().collect();
        let lines = wrap(&chars, 0, None, Some(0.0), WrapMode::Greedy, mono(&chars));
        assert!(lines.is_empty());
    }

    #[test]
    fn test_range_is_clamped() {
        let chars: Vec<char> = "abc def".chars().collect();
        let lines = wrap(&chars, 4, Some(100), None, WrapMode::Greedy, mono(&chars));
        assert_eq!(texts(&chars, &lines), vec!["def"]);
    }
}
