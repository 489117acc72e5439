// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Dirty region detection between two versions of a block sequence.
//!
//! Blocks are compared by id and by a per-kind structural predicate that
//! looks at rendering-relevant data only. Upstream positions are ignored,
//! so typing in one paragraph does not dirty every paragraph after it.

use crate::model::*;
use rustc_hash::FxHashSet;
use std::ops::Range;
use tracing::trace;

/// Result of comparing two block sequences. Recomputed on every call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtyRegion {
    /// Index in the next sequence where re-layout must start. Equal to the
    /// length of the next sequence when nothing is dirty.
    pub first_dirty_index: usize,
    /// Last index of the unchanged prefix in the next sequence.
    pub last_stable_index: Option<usize>,
    /// Ids present only in the next sequence, in next order.
    pub inserted_block_ids: Vec<String>,
    /// Ids present only in the previous sequence, in previous order.
    pub deleted_block_ids: Vec<String>,
}

impl DirtyRegion {
    #[inline]
    pub fn is_clean(&self, next_len: usize) -> bool {
        self.first_dirty_index >= next_len
    }

    /// Indices of the next sequence that need to be laid out again.
    #[inline]
    pub fn dirty_range(&self, next_len: usize) -> Range<usize> {
        self.first_dirty_index.min(next_len)..next_len
    }
}

/// Computes the minimal re-layout region between `previous` and `next`.
pub fn compute_dirty_region(previous: &[FlowBlock], next: &[FlowBlock]) -> DirtyRegion {
    let previous_ids: FxHashSet<&str> = previous.iter().map(FlowBlock::id).collect();
    let next_ids: FxHashSet<&str> = next.iter().map(FlowBlock::id).collect();

    let mut first_dirty_index = next.len();
    let mut last_stable_index = None;
    let mut prev_index = 0;
    let mut next_index = 0;

    while prev_index < previous.len() && next_index < next.len() {
        let prev_block = &previous[prev_index];
        let next_block = &next[next_index];

        if prev_block.id() == next_block.id() && blocks_equal(prev_block, next_block) {
            if first_dirty_index == next.len() {
                last_stable_index = Some(next_index);
            }
            prev_index += 1;
            next_index += 1;
            continue;
        }

        first_dirty_index = first_dirty_index.min(next_index);

        if !next_ids.contains(prev_block.id()) {
            // Deleted block.
            prev_index += 1;
        } else if !previous_ids.contains(next_block.id()) {
            // Inserted block.
            next_index += 1;
        } else {
            // Replaced in place, or moved.
            prev_index += 1;
            next_index += 1;
        }
    }

    // Only reachable when one sequence is a strict prefix of the other.
    if first_dirty_index == next.len() && previous.len() != next.len() {
        first_dirty_index = prev_index.min(next_index);
    }

    let inserted_block_ids = unique_ids_missing_from(next, &previous_ids);
    let deleted_block_ids = unique_ids_missing_from(previous, &next_ids);

    trace!(
        "dirty region: first_dirty={first_dirty_index} last_stable={last_stable_index:?} \
         inserted={} deleted={}",
        inserted_block_ids.len(),
        deleted_block_ids.len()
    );

    DirtyRegion {
        first_dirty_index,
        last_stable_index,
        inserted_block_ids,
        deleted_block_ids,
    }
}

fn unique_ids_missing_from(blocks: &[FlowBlock], other: &FxHashSet<&str>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    blocks
        .iter()
        .map(FlowBlock::id)
        .filter(|id| !other.contains(id) && seen.insert(*id))
        .map(str::to_owned)
        .collect()
}

/// Structural equality over rendering-relevant data. Blocks of different
/// kinds are never equal.
pub fn blocks_equal(a: &FlowBlock, b: &FlowBlock) -> bool {
    match (a, b) {
        (FlowBlock::Paragraph(a), FlowBlock::Paragraph(b)) => paragraphs_equal(a, b),
        (FlowBlock::Table(a), FlowBlock::Table(b)) => tables_equal(a, b),
        (FlowBlock::Image(a), FlowBlock::Image(b)) => images_equal(a, b),
        (FlowBlock::Drawing(a), FlowBlock::Drawing(b)) => drawings_equal(a, b),
        _ => false,
    }
}

pub fn paragraphs_equal(a: &ParagraphBlock, b: &ParagraphBlock) -> bool {
    a.attrs.tracked_changes_mode() == b.attrs.tracked_changes_mode()
        && a.attrs.tracked_changes_enabled() == b.attrs.tracked_changes_enabled()
        && a.attrs == b.attrs
        && a.runs.len() == b.runs.len()
        && a.runs.iter().zip(&b.runs).all(|(a, b)| runs_equal(a, b))
}

/// Compares runs field by field, skipping `source_range`. The exhaustive
/// destructuring makes a newly added field a compile error here.
pub fn runs_equal(a: &Run, b: &Run) -> bool {
    match (a, b) {
        (Run::Text(a), Run::Text(b)) => {
            let TextRun {
                text,
                marks,
                tracked_change,
                comments,
                source_range: _,
            } = a;
            *text == b.text
                && *marks == b.marks
                && *tracked_change == b.tracked_change
                && *comments == b.comments
        }
        (Run::Image(a), Run::Image(b)) => {
            let ImageRun {
                src,
                width,
                height,
                source_range: _,
            } = a;
            *src == b.src && *width == b.width && *height == b.height
        }
        (Run::Tab(a), Run::Tab(b)) => a.marks == b.marks,
        (Run::LineBreak(a), Run::LineBreak(b)) | (Run::Break(a), Run::Break(b)) => {
            a.break_type == b.break_type && a.marks == b.marks
        }
        (Run::FieldAnnotation(a), Run::FieldAnnotation(b)) => field_annotations_equal(a, b),
        _ => false,
    }
}

fn field_annotations_equal(a: &FieldAnnotationRun, b: &FieldAnnotationRun) -> bool {
    let FieldAnnotationRun {
        variant,
        display_label,
        image_src,
        link_url,
        raw_html,
        font_family,
        font_size,
        text_color,
        highlighted,
        bold,
        italic,
        underline,
        hidden,
        visibility,
        size,
        marks,
        tracked_change,
        comments,
        source_range: _,
    } = a;
    *variant == b.variant
        && *display_label == b.display_label
        && *image_src == b.image_src
        && *link_url == b.link_url
        && *raw_html == b.raw_html
        && *font_family == b.font_family
        && *font_size == b.font_size
        && *text_color == b.text_color
        && *highlighted == b.highlighted
        && *bold == b.bold
        && *italic == b.italic
        && *underline == b.underline
        && *hidden == b.hidden
        && *visibility == b.visibility
        && *size == b.size
        && *marks == b.marks
        && *tracked_change == b.tracked_change
        && *comments == b.comments
}

pub fn tables_equal(a: &TableBlock, b: &TableBlock) -> bool {
    a.attrs == b.attrs
        && a.rows.len() == b.rows.len()
        && a.rows.iter().zip(&b.rows).all(|(a, b)| {
            a.height == b.height
                && a.cells.len() == b.cells.len()
                && a.cells.iter().zip(&b.cells).all(|(a, b)| cells_equal(a, b))
        })
}

fn cells_equal(a: &TableCell, b: &TableCell) -> bool {
    let legacy_equal = match (&a.paragraph, &b.paragraph) {
        (Some(a), Some(b)) => paragraphs_equal(a, b),
        (None, None) => true,
        _ => false,
    };

    legacy_equal
        && a.attrs == b.attrs
        && a.blocks.len() == b.blocks.len()
        && a
            .blocks
            .iter()
            .zip(&b.blocks)
            .all(|(a, b)| a.id() == b.id() && blocks_equal(a, b))
}

pub fn images_equal(a: &ImageBlock, b: &ImageBlock) -> bool {
    let ImageBlock {
        id: _,
        src,
        width,
        height,
        anchor,
        wrap,
        margin,
        padding,
        object_fit,
        rotation,
        alt,
        source_range: _,
    } = a;
    *src == b.src
        && *width == b.width
        && *height == b.height
        && *anchor == b.anchor
        && *wrap == b.wrap
        && *margin == b.margin
        && *padding == b.padding
        && *object_fit == b.object_fit
        && *rotation == b.rotation
        && *alt == b.alt
}

pub fn drawings_equal(a: &DrawingBlock, b: &DrawingBlock) -> bool {
    let DrawingBlock {
        id: _,
        geometry,
        anchor,
        wrap,
        margin,
        padding,
        z_index,
        content,
        source_range: _,
    } = a;
    *geometry == b.geometry
        && *anchor == b.anchor
        && *wrap == b.wrap
        && *margin == b.margin
        && *padding == b.padding
        && *z_index == b.z_index
        && *content == b.content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(id: &str, text: &str) -> FlowBlock {
        ParagraphBlock::new(id, vec![Run::text(text)]).into()
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_replace_in_place() {
        let previous = vec![paragraph("A", "a"), paragraph("B", "b"), paragraph("C", "c")];
        let next = vec![paragraph("A", "a"), paragraph("X", "x"), paragraph("C", "c")];

        let region = compute_dirty_region(&previous, &next);
        assert_eq!(region.first_dirty_index, 1);
        assert_eq!(region.last_stable_index, Some(0));
        assert_eq!(region.inserted_block_ids, ids(&["X"]));
        assert_eq!(region.deleted_block_ids, ids(&["B"]));
        assert_eq!(region.dirty_range(next.len()), 1..3);
    }

    #[test]
    fn test_insertion() {
        let previous = vec![paragraph("A", "a"), paragraph("B", "b")];
        let next = vec![paragraph("A", "a"), paragraph("Z", "z"), paragraph("B", "b")];

        let region = compute_dirty_region(&previous, &next);
        assert_eq!(region.first_dirty_index, 1);
        assert_eq!(region.inserted_block_ids, ids(&["Z"]));
        assert!(region.deleted_block_ids.is_empty());
    }

    #[test]
    fn test_deletion() {
        let previous = vec![paragraph("A", "a"), paragraph("B", "b"), paragraph("C", "c")];
        let next = vec![paragraph("A", "a"), paragraph("C", "c")];

        let region = compute_dirty_region(&previous, &next);
        assert_eq!(region.first_dirty_index, 1);
        assert_eq!(region.last_stable_index, Some(0));
        assert!(region.inserted_block_ids.is_empty());
        assert_eq!(region.deleted_block_ids, ids(&["B"]));
    }

    #[test]
    fn test_no_change() {
        let previous = vec![paragraph("A", "a"), paragraph("B", "b")];
        let next = previous.clone();

        let region = compute_dirty_region(&previous, &next);
        assert_eq!(region.first_dirty_index, next.len());
        assert_eq!(region.last_stable_index, Some(1));
        assert!(region.inserted_block_ids.is_empty());
        assert!(region.deleted_block_ids.is_empty());
        assert!(region.is_clean(next.len()));
        assert!(region.dirty_range(next.len()).is_empty());
    }

    #[test]
    fn test_content_edit_keeps_ids() {
        let previous = vec![paragraph("A", "a"), paragraph("B", "b"), paragraph("C", "c")];
        let next = vec![paragraph("A", "a"), paragraph("B", "b!"), paragraph("C", "c")];

        let region = compute_dirty_region(&previous, &next);
        assert_eq!(region.first_dirty_index, 1);
        assert!(region.inserted_block_ids.is_empty());
        assert!(region.deleted_block_ids.is_empty());
    }

    #[test]
    fn test_shifted_source_ranges_stay_clean() {
        let previous = vec![paragraph("A", "a"), paragraph("B", "b")];
        let mut next = previous.clone();
        if let FlowBlock::Paragraph(block) = &mut next[1] {
            block.source_range = Some(SourceRange::new(10, 12));
            if let Run::Text(run) = &mut block.runs[0] {
                run.source_range = Some(SourceRange::new(11, 12));
            }
        }

        let region = compute_dirty_region(&previous, &next);
        assert!(region.is_clean(next.len()));
    }

    #[test]
    fn test_append_reports_first_new_index() {
        let previous = vec![paragraph("A", "a")];
        let next = vec![paragraph("A", "a"), paragraph("B", "b")];

        let region = compute_dirty_region(&previous, &next);
        assert_eq!(region.first_dirty_index, 1);
        assert_eq!(region.last_stable_index, Some(0));
        assert_eq!(region.inserted_block_ids, ids(&["B"]));
    }

    #[test]
    fn test_truncation_reports_deleted_tail() {
        let previous = vec![paragraph("A", "a"), paragraph("B", "b")];
        let next = vec![paragraph("A", "a")];

        let region = compute_dirty_region(&previous, &next);
        assert_eq!(region.first_dirty_index, 1);
        assert_eq!(region.deleted_block_ids, ids(&["B"]));
    }

    #[test]
    fn test_id_deltas_cover_whole_sequences() {
        let previous = vec![
            paragraph("A", "a"),
            paragraph("B", "b"),
            paragraph("C", "c"),
            paragraph("D", "d"),
        ];
        let next = vec![
            paragraph("X", "x"),
            paragraph("B", "b"),
            paragraph("C", "c"),
            paragraph("E", "e"),
        ];

        let region = compute_dirty_region(&previous, &next);
        assert_eq!(region.first_dirty_index, 0);
        assert_eq!(region.last_stable_index, None);
        assert_eq!(region.inserted_block_ids, ids(&["X", "E"]));
        assert_eq!(region.deleted_block_ids, ids(&["A", "D"]));
    }

    #[test]
    fn test_empty_sequences() {
        let region = compute_dirty_region(&[], &[]);
        assert_eq!(region, DirtyRegion::default());

        let next = vec![paragraph("A", "a")];
        let region = compute_dirty_region(&[], &next);
        assert_eq!(region.first_dirty_index, 0);
        assert_eq!(region.inserted_block_ids, ids(&["A"]));
    }

    #[test]
    fn test_kind_change_with_same_id_is_dirty() {
        let previous = vec![paragraph("A", "a")];
        let next = vec![FlowBlock::Image(ImageBlock {
            id: "A".into(),
            src: "a.png".into(),
            ..Default::default()
        })];

        let region = compute_dirty_region(&previous, &next);
        assert_eq!(region.first_dirty_index, 0);
        assert!(region.inserted_block_ids.is_empty());
    }

    #[test]
    fn test_paragraph_attrs_and_marks_are_compared() {
        let base = ParagraphBlock::new("A", vec![Run::text("a")]);

        let mut centered = base.clone();
        centered.attrs.alignment = Some(Alignment::Center);
        assert!(!paragraphs_equal(&base, &centered));

        let bold = ParagraphBlock::new("A", vec![Run::styled("a", RunMarks::default().bold())]);
        assert!(!paragraphs_equal(&base, &bold));

        let mut commented = base.clone();
        if let Run::Text(run) = &mut commented.runs[0] {
            run.comments.push(CommentAnnotation {
                id: "c1".into(),
                internal: false,
            });
        }
        assert!(!paragraphs_equal(&base, &commented));
    }

    #[test]
    fn test_drawing_and_image_equality() {
        let group = |offset_x: f32| DrawingBlock {
            id: "d".into(),
            content: DrawingContent::ShapeGroup(ShapeGroup {
                children: vec![DrawingChild {
                    offset_x,
                    ..Default::default()
                }],
                transform: None,
            }),
            ..Default::default()
        };
        assert!(drawings_equal(&group(1.), &group(1.)));
        assert!(!drawings_equal(&group(1.), &group(2.)));

        let image = |wrap: WrapMode| ImageBlock {
            id: "i".into(),
            wrap: Some(Wrap {
                mode: wrap,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(images_equal(&image(WrapMode::Square), &image(WrapMode::Square)));
        assert!(!images_equal(&image(WrapMode::Square), &image(WrapMode::Tight)));
    }

    #[test]
    fn test_table_cells_are_compared() {
        let table = |text: &str| TableBlock {
            id: "t".into(),
            rows: vec![TableRow {
                cells: vec![TableCell::new(vec![paragraph("c1", text)])],
                height: None,
            }],
            ..Default::default()
        };
        assert!(tables_equal(&table("a"), &table("a")));
        assert!(!tables_equal(&table("a"), &table("b")));
    }
}
