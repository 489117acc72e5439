// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visual attributes attached to paragraphs, tables, cells and floating objects.
//!
//! Every field here is rendering-relevant unless stated otherwise. Pixel
//! values are CSS pixels at 96 DPI, tab positions and intervals are twips.

use super::run::RunMarks;
use serde::{Deserialize, Serialize};

/// Horizontal alignment of a paragraph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineRule {
    #[default]
    Auto,
    Exact,
    AtLeast,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Spacing {
    pub before: Option<f32>,
    pub after: Option<f32>,
    pub line: Option<f32>,
    pub line_rule: Option<LineRule>,
    pub before_autospacing: bool,
    pub after_autospacing: bool,
}

/// Paragraph indentation in pixels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Indent {
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub first_line: Option<f32>,
    pub hanging: Option<f32>,
}

impl Indent {
    #[inline]
    pub fn left(&self) -> f32 {
        self.left.unwrap_or(0.)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.right.unwrap_or(0.)
    }

    #[inline]
    pub fn first_line(&self) -> f32 {
        self.first_line.unwrap_or(0.)
    }

    #[inline]
    pub fn hanging(&self) -> f32 {
        self.hanging.unwrap_or(0.)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BorderSpec {
    pub style: Option<String>,
    pub width: Option<f32>,
    pub color: Option<String>,
    pub space: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphBorders {
    pub top: Option<BorderSpec>,
    pub right: Option<BorderSpec>,
    pub bottom: Option<BorderSpec>,
    pub left: Option<BorderSpec>,
    pub between: Option<BorderSpec>,
    pub bar: Option<BorderSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shading {
    pub fill: Option<String>,
    pub color: Option<String>,
    pub pattern: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabAlignment {
    #[default]
    Start,
    Center,
    End,
    Decimal,
    Bar,
    /// Removes an inherited stop at the same position.
    Clear,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabLeader {
    #[default]
    None,
    Dot,
    Hyphen,
    Underscore,
    Heavy,
    MiddleDot,
}

/// An explicit tab stop. `pos` is measured in twips from the paragraph's
/// content-box start edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabStop {
    pub pos: f32,
    pub alignment: TabAlignment,
    pub leader: Option<TabLeader>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropCapMode {
    #[default]
    Drop,
    Margin,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropCap {
    pub mode: DropCapMode,
    pub lines: u32,
    pub h_space: Option<f32>,
}

/// Text-frame positioning (`w:framePr`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameProps {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub h_anchor: Option<String>,
    pub v_anchor: Option<String>,
    pub x_align: Option<String>,
    pub y_align: Option<String>,
    pub wrap: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerSuffix {
    #[default]
    Tab,
    Space,
    Nothing,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerJustification {
    #[default]
    Left,
    Center,
    Right,
}

/// Resolved list marker of a numbered or bulleted paragraph.
///
/// `text` is the already-rendered marker ("1.", "a)", "•"). An empty
/// string is a legal marker and is distinct from having no marker at all.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListMarker {
    pub text: String,
    pub suffix: MarkerSuffix,
    pub justification: MarkerJustification,
    pub marks: RunMarks,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackedChangesMode {
    #[default]
    Review,
    Original,
    Final,
    Off,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphAttrs {
    pub alignment: Option<Alignment>,
    pub spacing: Option<Spacing>,
    pub indent: Option<Indent>,
    pub borders: Option<ParagraphBorders>,
    pub shading: Option<Shading>,
    pub tabs: Vec<TabStop>,
    pub direction: Option<Direction>,
    pub rtl: bool,
    pub keep_next: bool,
    pub keep_lines: bool,
    pub page_break_before: bool,
    pub widow_control: Option<bool>,
    pub contextual_spacing: bool,
    pub drop_cap: Option<DropCap>,
    pub frame: Option<FrameProps>,
    pub tab_interval_twips: Option<f32>,
    pub decimal_separator: Option<char>,
    pub list_marker: Option<ListMarker>,
    pub tracked_changes_mode: Option<TrackedChangesMode>,
    pub tracked_changes_enabled: Option<bool>,
}

impl ParagraphAttrs {
    /// Whether tracked changes render as annotations. An explicit flag wins,
    /// otherwise everything but [`TrackedChangesMode::Off`] counts as enabled.
    pub fn tracked_changes_enabled(&self) -> bool {
        self.tracked_changes_enabled
            .unwrap_or(self.tracked_changes_mode != Some(TrackedChangesMode::Off))
    }

    #[inline]
    pub fn tracked_changes_mode(&self) -> TrackedChangesMode {
        self.tracked_changes_mode.unwrap_or_default()
    }
}

/// Per-edge spacing used for cell padding and object margins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoxSpacing {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellBorders {
    pub top: Option<BorderSpec>,
    pub right: Option<BorderSpec>,
    pub bottom: Option<BorderSpec>,
    pub left: Option<BorderSpec>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellAttrs {
    pub borders: Option<CellBorders>,
    pub padding: Option<BoxSpacing>,
    pub vertical_align: Option<VerticalAlign>,
    pub background: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableBorders {
    pub top: Option<BorderSpec>,
    pub right: Option<BorderSpec>,
    pub bottom: Option<BorderSpec>,
    pub left: Option<BorderSpec>,
    pub inside_h: Option<BorderSpec>,
    pub inside_v: Option<BorderSpec>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderCollapse {
    #[default]
    Collapse,
    Separate,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableAttrs {
    pub borders: Option<TableBorders>,
    pub border_collapse: Option<BorderCollapse>,
    pub cell_spacing: Option<f32>,
}

/// Anchoring of a floating image or drawing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Anchor {
    pub is_anchored: bool,
    pub h_relative_from: Option<String>,
    pub v_relative_from: Option<String>,
    pub offset_h: f32,
    pub offset_v: f32,
    pub behind_doc: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WrapMode {
    #[default]
    Inline,
    Square,
    Tight,
    Through,
    TopAndBottom,
    None,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wrap {
    pub mode: WrapMode,
    pub wrap_text: Option<String>,
    pub distances: Option<BoxSpacing>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Geometry {
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub flip_h: bool,
    pub flip_v: bool,
}
