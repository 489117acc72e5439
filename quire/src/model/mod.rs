// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Flow blocks handed to the layout core by the content-model layer.
//!
//! The core only ever reads these values. Ids are expected to be stable
//! across edits; an empty id means the block cannot be cached or tracked.

mod attrs;
mod run;

pub use attrs::*;
pub use run::*;

use serde::{Deserialize, Serialize};

/// Position of a node in the upstream editing model.
///
/// Not rendering-relevant: fingerprints and the dirty-region differ ignore
/// it, so an edit that only shifts positions does not invalidate layout.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphBlock {
    pub id: String,
    pub runs: Vec<Run>,
    pub attrs: ParagraphAttrs,
    pub source_range: Option<SourceRange>,
}

impl ParagraphBlock {
    pub fn new(id: impl Into<String>, runs: Vec<Run>) -> Self {
        Self {
            id: id.into(),
            runs,
            ..Self::default()
        }
    }

    pub fn with_attrs(mut self, attrs: ParagraphAttrs) -> Self {
        self.attrs = attrs;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableCell {
    pub blocks: Vec<FlowBlock>,
    /// Single-paragraph cell shape produced by older importers.
    pub paragraph: Option<ParagraphBlock>,
    pub attrs: CellAttrs,
}

impl TableCell {
    pub fn new(blocks: Vec<FlowBlock>) -> Self {
        Self {
            blocks,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub height: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableBlock {
    pub id: String,
    pub rows: Vec<TableRow>,
    pub attrs: TableAttrs,
    pub source_range: Option<SourceRange>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageBlock {
    pub id: String,
    pub src: String,
    pub width: f32,
    pub height: f32,
    pub anchor: Option<Anchor>,
    pub wrap: Option<Wrap>,
    pub margin: Option<BoxSpacing>,
    pub padding: Option<BoxSpacing>,
    pub object_fit: Option<String>,
    pub rotation: Option<f32>,
    pub alt: Option<String>,
    pub source_range: Option<SourceRange>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VectorShape {
    pub shape_kind: String,
    pub fill: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f32>,
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawingChild {
    pub geometry: Geometry,
    pub offset_x: f32,
    pub offset_y: f32,
    pub shape: VectorShape,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeGroup {
    pub children: Vec<DrawingChild>,
    pub transform: Option<Geometry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawingImage {
    pub src: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "drawingKind", rename_all = "camelCase")]
pub enum DrawingContent {
    VectorShape(VectorShape),
    ShapeGroup(ShapeGroup),
    Image(DrawingImage),
}

impl Default for DrawingContent {
    fn default() -> Self {
        DrawingContent::VectorShape(VectorShape::default())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawingBlock {
    pub id: String,
    pub geometry: Geometry,
    pub anchor: Option<Anchor>,
    pub wrap: Option<Wrap>,
    pub margin: Option<BoxSpacing>,
    pub padding: Option<BoxSpacing>,
    pub z_index: Option<i32>,
    pub content: DrawingContent,
    pub source_range: Option<SourceRange>,
}

/// A laid-out document unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FlowBlock {
    Paragraph(ParagraphBlock),
    Table(TableBlock),
    Image(ImageBlock),
    Drawing(DrawingBlock),
}

impl FlowBlock {
    #[inline]
    pub fn id(&self) -> &str {
        match self {
            FlowBlock::Paragraph(block) => &block.id,
            FlowBlock::Table(block) => &block.id,
            FlowBlock::Image(block) => &block.id,
            FlowBlock::Drawing(block) => &block.id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FlowBlock::Paragraph(_) => "paragraph",
            FlowBlock::Table(_) => "table",
            FlowBlock::Image(_) => "image",
            FlowBlock::Drawing(_) => "drawing",
        }
    }

    pub fn as_paragraph(&self) -> Option<&ParagraphBlock> {
        match self {
            FlowBlock::Paragraph(block) => Some(block),
            _ => None,
        }
    }
}

impl From<ParagraphBlock> for FlowBlock {
    fn from(block: ParagraphBlock) -> Self {
        FlowBlock::Paragraph(block)
    }
}

impl From<TableBlock> for FlowBlock {
    fn from(block: TableBlock) -> Self {
        FlowBlock::Table(block)
    }
}

impl From<ImageBlock> for FlowBlock {
    fn from(block: ImageBlock) -> Self {
        FlowBlock::Image(block)
    }
}

impl From<DrawingBlock> for FlowBlock {
    fn from(block: DrawingBlock) -> Self {
        FlowBlock::Drawing(block)
    }
}
