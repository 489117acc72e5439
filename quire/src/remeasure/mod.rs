// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Fast greedy line breaking for a single paragraph.
//!
//! This is the approximate path used while the user resizes or edits: it
//! walks the runs once, measuring each character through a
//! [`TextMeasurer`], and cuts lines at the last space, tab or hyphen that
//! fits. High-fidelity measurement (shaping, ascent/descent) belongs to the
//! host.

mod measurer;
mod tabs;

pub use measurer::{HeuristicMeasurer, MeasureFont, TextMeasurer};
pub use tabs::TabStops;

use crate::config::{LayoutConfig, TWIPS_PER_PX};
use crate::error::RemeasureError;
use crate::model::{
    FieldAnnotationRun, FlowBlock, Indent, LineRule, ListMarker, MarkerSuffix,
    ParagraphBlock, Run, Spacing,
};
use measurer::transform_char;
use serde::{Deserialize, Serialize};
use tracing::trace;

pub type Result<T> = std::result::Result<T, RemeasureError>;

/// One laid-out line. It covers the half-open range
/// `[(from_run, from_char), (to_run, to_char))`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub from_run: usize,
    pub from_char: usize,
    pub to_run: usize,
    pub to_char: usize,
    pub width: f32,
    pub line_height: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerMetrics {
    pub marker_box_width: f32,
    pub marker_text_width: f32,
    pub indent_left: f32,
    pub gutter_width: f32,
}

/// Result of laying out one block at one width.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub lines: Vec<Line>,
    pub total_height: f32,
    pub marker: Option<MarkerMetrics>,
}

impl Measure {
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn max_line_width(&self) -> f32 {
        self.lines.iter().map(|line| line.width).fold(0., f32::max)
    }
}

#[derive(Clone, Copy, Debug)]
enum UnitKind {
    Advance {
        width: f32,
        break_after: bool,
        hangs: bool,
    },
    Tab,
    HardBreak,
}

/// Smallest breakable piece of a paragraph: a character, a tab, a hard
/// break or an atomic inline object.
#[derive(Clone, Copy, Debug)]
struct Unit {
    run: usize,
    index: usize,
    kind: UnitKind,
    font_size: Option<f32>,
    height: f32,
}

struct ParagraphLayout<'a> {
    content_width: f32,
    first_line_offset: f32,
    marker_intrusion: f32,
    tabs: TabStops,
    spacing: Option<&'a Spacing>,
}

#[inline]
fn is_break_opportunity(ch: char) -> bool {
    matches!(ch, ' ' | '-' | '\u{2010}' | '\u{200B}')
}

#[inline]
fn non_negative(value: f32) -> f32 {
    if value.is_finite() && value > 0. {
        value
    } else {
        0.
    }
}

#[inline]
fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.
    }
}

fn validate(max_width: f32, first_line_indent: Option<f32>) -> Result<()> {
    if !max_width.is_finite() || max_width <= 0. {
        return Err(RemeasureError::InvalidMaxWidth(max_width));
    }
    if let Some(indent) = first_line_indent {
        if !indent.is_finite() {
            return Err(RemeasureError::InvalidFirstLineIndent(indent));
        }
    }
    Ok(())
}

/// Remeasures `block` with the heuristic measurer and default configuration.
pub fn remeasure_paragraph(
    block: &FlowBlock,
    max_width: f32,
    first_line_indent: Option<f32>,
) -> Result<Measure> {
    Remeasurer::default().remeasure(block, max_width, first_line_indent)
}

pub struct Remeasurer<M = HeuristicMeasurer> {
    measurer: M,
    config: LayoutConfig,
}

impl Remeasurer<HeuristicMeasurer> {
    pub fn new(config: LayoutConfig) -> Self {
        let measurer = HeuristicMeasurer {
            char_width_factor: config.char_width_factor,
        };
        Self { measurer, config }
    }
}

impl Default for Remeasurer<HeuristicMeasurer> {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl<M: TextMeasurer> Remeasurer<M> {
    pub fn with_measurer(measurer: M, config: LayoutConfig) -> Self {
        Self { measurer, config }
    }

    #[inline]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[inline]
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Lays out `block` at `max_width`. `first_line_indent` overrides the
    /// paragraph's own first-line offset when given.
    pub fn remeasure(
        &self,
        block: &FlowBlock,
        max_width: f32,
        first_line_indent: Option<f32>,
    ) -> Result<Measure> {
        validate(max_width, first_line_indent)?;
        match block {
            FlowBlock::Paragraph(paragraph) => {
                self.remeasure_paragraph(paragraph, max_width, first_line_indent)
            }
            other => Err(RemeasureError::NotAParagraph {
                id: other.id().to_owned(),
                kind: other.kind_name(),
            }),
        }
    }

    pub fn remeasure_paragraph(
        &self,
        paragraph: &ParagraphBlock,
        max_width: f32,
        first_line_indent: Option<f32>,
    ) -> Result<Measure> {
        validate(max_width, first_line_indent)?;

        let attrs = &paragraph.attrs;
        let no_indent = Indent::default();
        let indent = attrs.indent.as_ref().unwrap_or(&no_indent);
        let left = finite_or_zero(indent.left());
        let right = finite_or_zero(indent.right());
        let first_line = finite_or_zero(indent.first_line());
        let hanging = finite_or_zero(indent.hanging());

        let marker = attrs
            .list_marker
            .as_ref()
            .map(|marker| self.marker_metrics(marker, left, hanging));

        let mut first_line_offset = first_line_indent.unwrap_or(first_line - hanging);
        if first_line_offset < 0. && (marker.is_some() || left < 0. || right < 0.) {
            first_line_offset = 0.;
        }

        let interval = attrs
            .tab_interval_twips
            .filter(|twips| twips.is_finite() && *twips > 0.)
            .map_or(self.config.tab_interval_px(), |twips| twips / TWIPS_PER_PX);

        let layout = ParagraphLayout {
            content_width: (max_width - left - right).max(1.),
            first_line_offset,
            marker_intrusion: marker
                .map_or(0., |marker| (marker.marker_box_width - hanging).max(0.)),
            tabs: TabStops::new(&attrs.tabs, interval, left),
            spacing: attrs.spacing.as_ref(),
        };

        let units = self.collect_units(&paragraph.runs);
        let lines = self.break_lines(&units, &layout);
        let total_height: f32 = lines.iter().map(|line| line.line_height).sum();

        trace!(
            "remeasured paragraph {} at {max_width}px: {} lines, {total_height}px",
            paragraph.id,
            lines.len()
        );

        Ok(Measure {
            lines,
            total_height,
            marker,
        })
    }

    fn marker_metrics(&self, marker: &ListMarker, left: f32, hanging: f32) -> MarkerMetrics {
        let font = MeasureFont::from_marks(&marker.marks, self.config.default_font_size);
        let marker_text_width = if marker.text.is_empty() {
            0.
        } else {
            non_negative(self.measurer.measure_text(&marker.text, &font))
        };
        let gutter_width = match marker.suffix {
            MarkerSuffix::Tab | MarkerSuffix::Space => self.config.marker_gutter,
            MarkerSuffix::Nothing => 0.,
        };

        MarkerMetrics {
            marker_box_width: (marker_text_width + gutter_width).max(hanging),
            marker_text_width,
            indent_left: left,
            gutter_width,
        }
    }

    fn field_width(&self, field: &FieldAnnotationRun, font_size: f32) -> f32 {
        if let Some(size) = field.size.filter(|size| size.width.is_finite() && size.width > 0.)
        {
            return size.width;
        }

        let font = MeasureFont {
            family: field
                .font_family
                .as_deref()
                .or(field.marks.font_family.as_deref()),
            size: font_size,
            bold: field.bold || field.marks.bold,
            italic: field.italic || field.marks.italic,
        };
        non_negative(self.measurer.measure_text(&field.display_label, &font))
    }

    fn collect_units(&self, runs: &[Run]) -> Vec<Unit> {
        let default_size = self.config.default_font_size;
        let mut units = Vec::with_capacity(runs.len() * 8);
        let mut buffer = String::with_capacity(4);
        let mut previous: Option<char> = None;

        for (run_index, run) in runs.iter().enumerate() {
            match run {
                Run::Text(text) => {
                    let font = MeasureFont::from_marks(&text.marks, default_size);
                    let transform = text.marks.text_transform.unwrap_or_default();
                    let letter_spacing = text.marks.letter_spacing.map_or(0., finite_or_zero);

                    for (index, ch) in text.text.chars().enumerate() {
                        let kind = match ch {
                            '\t' => UnitKind::Tab,
                            '\n' => UnitKind::HardBreak,
                            _ => {
                                transform_char(ch, previous, transform, &mut buffer);
                                let width = self.measurer.measure_text(&buffer, &font);
                                UnitKind::Advance {
                                    width: non_negative(width + letter_spacing),
                                    break_after: is_break_opportunity(ch),
                                    hangs: ch == ' ',
                                }
                            }
                        };
                        units.push(Unit {
                            run: run_index,
                            index,
                            kind,
                            font_size: Some(font.size),
                            height: 0.,
                        });
                        previous = Some(ch);
                    }
                    continue;
                }
                Run::Tab(tab) => units.push(Unit {
                    run: run_index,
                    index: 0,
                    kind: UnitKind::Tab,
                    font_size: Some(tab.marks.font_size.unwrap_or(default_size)),
                    height: 0.,
                }),
                Run::LineBreak(brk) | Run::Break(brk) => units.push(Unit {
                    run: run_index,
                    index: 0,
                    kind: UnitKind::HardBreak,
                    font_size: Some(brk.marks.font_size.unwrap_or(default_size)),
                    height: 0.,
                }),
                Run::Image(image) => units.push(Unit {
                    run: run_index,
                    index: 0,
                    kind: UnitKind::Advance {
                        width: non_negative(image.width),
                        break_after: false,
                        hangs: false,
                    },
                    font_size: None,
                    height: non_negative(image.height),
                }),
                Run::FieldAnnotation(field) => {
                    let (width, font_size, height) = if field.hidden {
                        (0., None, 0.)
                    } else {
                        let size = run.font_size().unwrap_or(default_size);
                        let height = field.size.map_or(0., |size| non_negative(size.height));
                        (self.field_width(field, size), Some(size), height)
                    };
                    units.push(Unit {
                        run: run_index,
                        index: 0,
                        kind: UnitKind::Advance {
                            width,
                            break_after: false,
                            hangs: false,
                        },
                        font_size,
                        height,
                    });
                }
            }
            previous = None;
        }

        units
    }

    fn break_lines(&self, units: &[Unit], layout: &ParagraphLayout<'_>) -> Vec<Line> {
        let tolerance = self.config.subpixel_tolerance;
        let mut lines = Vec::new();
        let mut start = 0;
        let mut trailing_break = false;

        while start < units.len() {
            let (origin, available) = if lines.is_empty() {
                let offset = layout.first_line_offset;
                (offset, layout.content_width - offset - layout.marker_intrusion)
            } else {
                (0., layout.content_width)
            };
            let limit = available.max(1.) - tolerance;

            let mut width = 0.;
            let mut last_break: Option<(usize, f32)> = None;
            let mut tab_cursor = 0;
            let mut end = start;
            let mut hard_break = false;
            // Whether anything other than leading spaces sits on the line.
            let mut has_content = false;

            while end < units.len() {
                let (advance, hangs) = match units[end].kind {
                    UnitKind::Advance { width, hangs, .. } => (width, hangs),
                    UnitKind::Tab => {
                        let x = origin + width;
                        ((layout.tabs.next_stop(x, &mut tab_cursor) - x).max(0.), false)
                    }
                    UnitKind::HardBreak => (0., false),
                };

                // Zero-width units never overflow, so a hard break always
                // lands on the line it terminates.
                if end > start && advance > 0. && width + advance > limit {
                    if hangs && has_content {
                        // Trailing spaces hang past the edge without widening
                        // the line.
                        end += 1;
                        last_break = Some((end, width));
                        continue;
                    }
                    if let Some((position, width_at_break)) = last_break {
                        end = position;
                        width = width_at_break;
                    }
                    break;
                }

                width += advance;
                end += 1;

                match units[end - 1].kind {
                    UnitKind::Advance {
                        break_after: true,
                        hangs,
                        ..
                    } => {
                        // A break after leading spaces would leave them on a
                        // line of their own.
                        if !hangs || has_content {
                            last_break = Some((end, width));
                        }
                    }
                    UnitKind::Tab => last_break = Some((end, width)),
                    UnitKind::HardBreak => {
                        hard_break = true;
                        break;
                    }
                    UnitKind::Advance { .. } => {}
                }
                has_content |= !hangs;
            }

            let first = units[start];
            let last = units[end - 1];
            lines.push(Line {
                from_run: first.run,
                from_char: first.index,
                to_run: last.run,
                to_char: last.index + 1,
                width,
                line_height: self.line_height(&units[start..end], layout.spacing),
            });

            trailing_break = hard_break;
            start = end;
        }

        // A paragraph always occupies at least one line, and a hard break at
        // the very end opens an empty one.
        if lines.is_empty() || trailing_break {
            let tail = &units[units.len().saturating_sub(1)..];
            let (run, index) = tail.first().map_or((0, 0), |unit| (unit.run, unit.index + 1));
            lines.push(Line {
                from_run: run,
                from_char: index,
                to_run: run,
                to_char: index,
                width: 0.,
                line_height: self.line_height(tail, layout.spacing),
            });
        }

        lines
    }

    fn line_height(&self, units: &[Unit], spacing: Option<&Spacing>) -> f32 {
        let font_size = units
            .iter()
            .filter_map(|unit| unit.font_size)
            .fold(None, |max: Option<f32>, size| Some(max.map_or(size, |m| m.max(size))))
            .unwrap_or(self.config.default_font_size);
        let object_height = units.iter().map(|unit| unit.height).fold(0., f32::max);
        let natural = (font_size * self.config.line_height_factor).max(object_height);

        let Some(spacing) = spacing else {
            return natural;
        };
        let Some(line) = spacing.line.filter(|line| line.is_finite() && *line > 0.) else {
            return natural;
        };

        match spacing.line_rule.unwrap_or_default() {
            // Auto spacing is a multiple of single spacing.
            LineRule::Auto => natural * line,
            LineRule::Exact => line,
            LineRule::AtLeast => natural.max(line),
        }
    }
}
