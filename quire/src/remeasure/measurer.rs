// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::model::{RunMarks, TextTransform};

/// Font description handed to a [`TextMeasurer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasureFont<'a> {
    pub family: Option<&'a str>,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl<'a> MeasureFont<'a> {
    pub fn from_marks(marks: &'a RunMarks, default_size: f32) -> Self {
        Self {
            family: marks.font_family.as_deref(),
            size: marks.font_size.unwrap_or(default_size),
            bold: marks.bold,
            italic: marks.italic,
        }
    }
}

/// Width measurement capability injected into the remeasurer.
///
/// Hosts with access to real font metrics (a canvas, a shaper) implement
/// this; everything else falls back to [`HeuristicMeasurer`].
pub trait TextMeasurer {
    /// Advance width of `text` in pixels.
    fn measure_text(&self, text: &str, font: &MeasureFont<'_>) -> f32;
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    #[inline]
    fn measure_text(&self, text: &str, font: &MeasureFont<'_>) -> f32 {
        (**self).measure_text(text, font)
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for Box<M> {
    #[inline]
    fn measure_text(&self, text: &str, font: &MeasureFont<'_>) -> f32 {
        (**self).measure_text(text, font)
    }
}

/// Fixed width per character, proportional to the font size.
///
/// Deliberately approximate: it ignores glyph shapes, so monospace and
/// non-Latin text measure poorly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicMeasurer {
    pub char_width_factor: f32,
}

impl Default for HeuristicMeasurer {
    fn default() -> Self {
        Self {
            char_width_factor: 0.5,
        }
    }
}

impl TextMeasurer for HeuristicMeasurer {
    #[inline]
    fn measure_text(&self, text: &str, font: &MeasureFont<'_>) -> f32 {
        text.chars().count() as f32 * font.size * self.char_width_factor
    }
}

/// Applies `transform` to `ch` for measurement only, writing the result
/// into `out`. `previous` is the preceding character of the same word
/// context, used by [`TextTransform::Capitalize`].
pub(crate) fn transform_char(
    ch: char,
    previous: Option<char>,
    transform: TextTransform,
    out: &mut String,
) {
    out.clear();
    match transform {
        TextTransform::None => out.push(ch),
        TextTransform::Uppercase => out.extend(ch.to_uppercase()),
        TextTransform::Lowercase => out.extend(ch.to_lowercase()),
        TextTransform::Capitalize => {
            if previous.is_none_or(char::is_whitespace) {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
        }
    }
}
