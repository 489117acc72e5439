// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Inline content of a paragraph.

use super::SourceRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Specifies a case transformation for text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

/// Formatting marks applied to a run of text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunMarks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub color: Option<String>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub highlight: Option<String>,
    pub letter_spacing: Option<f32>,
    pub text_transform: Option<TextTransform>,
}

impl RunMarks {
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackedChangeKind {
    #[default]
    Insert,
    Delete,
    Format,
}

impl TrackedChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TrackedChangeKind::Insert => "insert",
            TrackedChangeKind::Delete => "delete",
            TrackedChangeKind::Format => "format",
        }
    }
}

/// One mark as it looked before or after a format change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkSnapshot {
    pub mark_type: String,
    pub attrs: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackedChange {
    pub kind: TrackedChangeKind,
    pub id: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub before: Vec<MarkSnapshot>,
    pub after: Vec<MarkSnapshot>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentAnnotation {
    pub id: String,
    pub internal: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextRun {
    pub text: String,
    pub marks: RunMarks,
    pub tracked_change: Option<TrackedChange>,
    pub comments: Vec<CommentAnnotation>,
    pub source_range: Option<SourceRange>,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_marks(mut self, marks: RunMarks) -> Self {
        self.marks = marks;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageRun {
    pub src: String,
    pub width: f32,
    pub height: f32,
    pub source_range: Option<SourceRange>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabRun {
    pub marks: RunMarks,
    pub source_range: Option<SourceRange>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BreakType {
    #[default]
    Line,
    Page,
    Column,
}

impl BreakType {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakType::Line => "line",
            BreakType::Page => "page",
            BreakType::Column => "column",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakRun {
    pub break_type: Option<BreakType>,
    pub marks: RunMarks,
    pub source_range: Option<SourceRange>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotationSize {
    pub width: f32,
    pub height: f32,
}

/// An inline form field (signature, checkbox, link, html snippet...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldAnnotationRun {
    pub variant: String,
    pub display_label: String,
    pub image_src: Option<String>,
    pub link_url: Option<String>,
    pub raw_html: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub text_color: Option<String>,
    pub highlighted: bool,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub hidden: bool,
    pub visibility: Option<String>,
    pub size: Option<AnnotationSize>,
    pub marks: RunMarks,
    pub tracked_change: Option<TrackedChange>,
    pub comments: Vec<CommentAnnotation>,
    pub source_range: Option<SourceRange>,
}

/// Smallest formatted unit of inline paragraph content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Run {
    Text(TextRun),
    Image(ImageRun),
    Tab(TabRun),
    LineBreak(BreakRun),
    Break(BreakRun),
    FieldAnnotation(FieldAnnotationRun),
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Run::Text(TextRun::new(text))
    }

    pub fn styled(text: impl Into<String>, marks: RunMarks) -> Self {
        Run::Text(TextRun::new(text).with_marks(marks))
    }

    pub fn tab() -> Self {
        Run::Tab(TabRun::default())
    }

    pub fn line_break() -> Self {
        Run::LineBreak(BreakRun::default())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Run::Text(_) => "text",
            Run::Image(_) => "image",
            Run::Tab(_) => "tab",
            Run::LineBreak(_) => "lineBreak",
            Run::Break(_) => "break",
            Run::FieldAnnotation(_) => "fieldAnnotation",
        }
    }

    /// Formatting marks, for the variants that carry them.
    pub fn marks(&self) -> Option<&RunMarks> {
        match self {
            Run::Text(run) => Some(&run.marks),
            Run::Tab(run) => Some(&run.marks),
            Run::LineBreak(run) | Run::Break(run) => Some(&run.marks),
            Run::FieldAnnotation(run) => Some(&run.marks),
            Run::Image(_) => None,
        }
    }

    pub fn source_range(&self) -> Option<SourceRange> {
        match self {
            Run::Text(run) => run.source_range,
            Run::Image(run) => run.source_range,
            Run::Tab(run) => run.source_range,
            Run::LineBreak(run) | Run::Break(run) => run.source_range,
            Run::FieldAnnotation(run) => run.source_range,
        }
    }

    /// Font size in pixels, if the run declares one.
    pub fn font_size(&self) -> Option<f32> {
        match self {
            Run::FieldAnnotation(run) => run.font_size.or(run.marks.font_size),
            _ => self.marks().and_then(|marks| marks.font_size),
        }
    }
}
