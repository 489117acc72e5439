// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Content fingerprints.
//!
//! A fingerprint is a delimited concatenation of every rendering-relevant
//! property of a block. Two blocks share a fingerprint exactly when they
//! would lay out identically, so the fingerprint is what keeps cached
//! measurements from going stale. It is not a cryptographic digest: it is
//! deterministic, order-sensitive and practically unique.
//!
//! Strings are written length-prefixed (`{chars}:{text}`) which keeps text
//! verbatim (whitespace included) while making it impossible for content to
//! forge a delimiter. Upstream positions (`source_range`) are never hashed.

use crate::model::*;
use std::fmt::{Display, Write};

const TEXT_PREFIX: &str = "tx:";
const IMAGE_PREFIX: &str = "img:";
const TAB_PREFIX: &str = "tab:";
const LINE_BREAK_PREFIX: &str = "lb:";
const BREAK_PREFIX: &str = "br:";
const FIELD_ANNOTATION_PREFIX: &str = "fa:";

/// Run-kind tags. A tag that prefixes another would let two different run
/// kinds produce the same fingerprint fragment.
const RUN_KIND_PREFIXES: [&str; 6] = [
    TEXT_PREFIX,
    IMAGE_PREFIX,
    TAB_PREFIX,
    LINE_BREAK_PREFIX,
    BREAK_PREFIX,
    FIELD_ANNOTATION_PREFIX,
];

const _: () = assert!(prefixes_are_disjoint(&RUN_KIND_PREFIXES));

/// Image sources may be data URIs; only this many characters are hashed.
const IMAGE_SRC_PREFIX_CHARS: usize = 64;

const fn is_prefix_of(prefix: &[u8], other: &[u8]) -> bool {
    if prefix.len() > other.len() {
        return false;
    }
    let mut i = 0;
    while i < prefix.len() {
        if prefix[i] != other[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn prefixes_are_disjoint(prefixes: &[&str]) -> bool {
    let mut i = 0;
    while i < prefixes.len() {
        let mut j = 0;
        while j < prefixes.len() {
            if i != j && is_prefix_of(prefixes[i].as_bytes(), prefixes[j].as_bytes()) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

/// Fingerprint of any flow block.
pub fn fingerprint(block: &FlowBlock) -> String {
    let mut writer = Writer::default();
    writer.block(block);
    writer.finish()
}

pub fn paragraph_fingerprint(paragraph: &ParagraphBlock) -> String {
    let mut writer = Writer::default();
    writer.paragraph(paragraph);
    writer.finish()
}

pub fn table_fingerprint(table: &TableBlock) -> String {
    let mut writer = Writer::default();
    writer.table(table);
    writer.finish()
}

/// Fingerprint of a run sequence alone, without paragraph attributes.
pub fn runs_fingerprint(runs: &[Run]) -> String {
    let mut writer = Writer::default();
    writer.runs(runs);
    writer.finish()
}

#[derive(Default)]
struct Writer {
    out: String,
}

impl Writer {
    #[inline]
    fn finish(self) -> String {
        self.out
    }

    #[inline]
    fn open(&mut self, tag: &str) {
        self.out.push_str(tag);
        self.out.push('[');
    }

    #[inline]
    fn close(&mut self) {
        self.out.push(']');
    }

    #[inline]
    fn value(&mut self, name: &str, value: impl Display) {
        let _ = write!(self.out, "{name}={value};");
    }

    #[inline]
    fn flag(&mut self, name: &str, value: bool) {
        self.value(name, u8::from(value));
    }

    fn opt<T: Display>(&mut self, name: &str, value: Option<T>) {
        match value {
            Some(value) => self.value(name, value),
            None => {
                let _ = write!(self.out, "{name}=~;");
            }
        }
    }

    fn text(&mut self, name: &str, text: &str) {
        let _ = write!(self.out, "{name}={}:{text};", text.chars().count());
    }

    fn opt_text(&mut self, name: &str, text: Option<&str>) {
        match text {
            Some(text) => self.text(name, text),
            None => {
                let _ = write!(self.out, "{name}=~;");
            }
        }
    }

    fn debug(&mut self, name: &str, value: Option<impl std::fmt::Debug>) {
        match value {
            Some(value) => {
                let _ = write!(self.out, "{name}={value:?};");
            }
            None => {
                let _ = write!(self.out, "{name}=~;");
            }
        }
    }

    fn block(&mut self, block: &FlowBlock) {
        match block {
            FlowBlock::Paragraph(paragraph) => self.paragraph(paragraph),
            FlowBlock::Table(table) => self.table(table),
            FlowBlock::Image(image) => self.image_block(image),
            FlowBlock::Drawing(drawing) => self.drawing_block(drawing),
        }
    }

    fn paragraph(&mut self, paragraph: &ParagraphBlock) {
        let attrs = &paragraph.attrs;
        self.open("p");
        self.value("tcm", format_args!("{:?}", attrs.tracked_changes_mode()));
        self.flag("tce", attrs.tracked_changes_enabled());
        self.paragraph_attrs(attrs);
        self.list_marker(attrs.list_marker.as_ref());
        self.runs(&paragraph.runs);
        self.close();
    }

    fn paragraph_attrs(&mut self, attrs: &ParagraphAttrs) {
        self.open("pa");
        self.debug("align", attrs.alignment);

        match &attrs.spacing {
            Some(spacing) => {
                self.open("sp");
                self.opt("b", spacing.before);
                self.opt("a", spacing.after);
                self.opt("l", spacing.line);
                self.debug("lr", spacing.line_rule);
                self.flag("ba", spacing.before_autospacing);
                self.flag("aa", spacing.after_autospacing);
                self.close();
            }
            None => self.out.push_str("sp=~;"),
        }

        match &attrs.indent {
            Some(indent) => {
                self.open("in");
                self.opt("l", indent.left);
                self.opt("r", indent.right);
                self.opt("f", indent.first_line);
                self.opt("h", indent.hanging);
                self.close();
            }
            None => self.out.push_str("in=~;"),
        }

        match &attrs.borders {
            Some(borders) => {
                self.open("bd");
                self.border("t", borders.top.as_ref());
                self.border("r", borders.right.as_ref());
                self.border("b", borders.bottom.as_ref());
                self.border("l", borders.left.as_ref());
                self.border("bw", borders.between.as_ref());
                self.border("bar", borders.bar.as_ref());
                self.close();
            }
            None => self.out.push_str("bd=~;"),
        }

        match &attrs.shading {
            Some(shading) => {
                self.open("sh");
                self.opt_text("f", shading.fill.as_deref());
                self.opt_text("c", shading.color.as_deref());
                self.opt_text("p", shading.pattern.as_deref());
                self.close();
            }
            None => self.out.push_str("sh=~;"),
        }

        self.open("tabs");
        for stop in &attrs.tabs {
            self.value("pos", stop.pos);
            self.value("al", format_args!("{:?}", stop.alignment));
            self.debug("ld", stop.leader);
        }
        self.close();

        self.debug("dir", attrs.direction);
        self.flag("rtl", attrs.rtl);
        self.flag("kn", attrs.keep_next);
        self.flag("kl", attrs.keep_lines);
        self.flag("pbb", attrs.page_break_before);
        self.opt("wc", attrs.widow_control.map(u8::from));
        self.flag("cs", attrs.contextual_spacing);

        match &attrs.drop_cap {
            Some(drop_cap) => {
                self.open("dc");
                self.value("m", format_args!("{:?}", drop_cap.mode));
                self.value("n", drop_cap.lines);
                self.opt("hs", drop_cap.h_space);
                self.close();
            }
            None => self.out.push_str("dc=~;"),
        }

        match &attrs.frame {
            Some(frame) => {
                self.open("fr");
                self.opt("w", frame.width);
                self.opt("h", frame.height);
                self.opt("x", frame.x);
                self.opt("y", frame.y);
                self.opt_text("ha", frame.h_anchor.as_deref());
                self.opt_text("va", frame.v_anchor.as_deref());
                self.opt_text("xa", frame.x_align.as_deref());
                self.opt_text("ya", frame.y_align.as_deref());
                self.opt_text("wr", frame.wrap.as_deref());
                self.close();
            }
            None => self.out.push_str("fr=~;"),
        }

        self.opt("ti", attrs.tab_interval_twips);
        self.opt("ds", attrs.decimal_separator);
        self.close();
    }

    /// Three distinct states: no marker, a marker with empty text, and a
    /// marker with text.
    fn list_marker(&mut self, marker: Option<&ListMarker>) {
        match marker {
            None => self.out.push_str("mk:none;"),
            Some(marker) => {
                if marker.text.is_empty() {
                    self.out.push_str("mk:empty;");
                } else {
                    let _ = write!(
                        self.out,
                        "mk:text={}:{};",
                        marker.text.chars().count(),
                        marker.text
                    );
                }
                self.value("mks", format_args!("{:?}", marker.suffix));
                self.value("mkj", format_args!("{:?}", marker.justification));
                self.marks(&marker.marks);
            }
        }
    }

    fn border(&mut self, name: &str, border: Option<&BorderSpec>) {
        match border {
            Some(border) => {
                self.open(name);
                self.opt_text("s", border.style.as_deref());
                self.opt("w", border.width);
                self.opt_text("c", border.color.as_deref());
                self.opt("sp", border.space);
                self.close();
            }
            None => {
                let _ = write!(self.out, "{name}=~;");
            }
        }
    }

    fn box_spacing(&mut self, name: &str, spacing: Option<&BoxSpacing>) {
        match spacing {
            Some(spacing) => {
                let _ = write!(
                    self.out,
                    "{name}={},{},{},{};",
                    spacing.top, spacing.right, spacing.bottom, spacing.left
                );
            }
            None => {
                let _ = write!(self.out, "{name}=~;");
            }
        }
    }

    fn runs(&mut self, runs: &[Run]) {
        self.open("runs");
        for run in runs {
            self.run(run);
            self.out.push('|');
        }
        self.close();
    }

    fn run(&mut self, run: &Run) {
        match run {
            Run::Text(text) => {
                let _ = write!(
                    self.out,
                    "{TEXT_PREFIX}{}:{};",
                    text.text.chars().count(),
                    text.text
                );
                self.marks(&text.marks);
                self.tracked_change(text.tracked_change.as_ref());
                self.comments(&text.comments);
            }
            Run::Image(image) => {
                let src: String = image.src.chars().take(IMAGE_SRC_PREFIX_CHARS).collect();
                let _ = write!(
                    self.out,
                    "{IMAGE_PREFIX}{}:{src}:{}x{};",
                    src.chars().count(),
                    image.width,
                    image.height
                );
            }
            Run::Tab(tab) => {
                self.out.push_str(TAB_PREFIX);
                self.marks(&tab.marks);
            }
            Run::LineBreak(line_break) => {
                self.out.push_str(LINE_BREAK_PREFIX);
                self.marks(&line_break.marks);
            }
            Run::Break(run_break) => {
                let kind = run_break.break_type.unwrap_or_default();
                let _ = write!(self.out, "{BREAK_PREFIX}{};", kind.as_str());
                self.marks(&run_break.marks);
            }
            Run::FieldAnnotation(field) => self.field_annotation(field),
        }
    }

    fn field_annotation(&mut self, field: &FieldAnnotationRun) {
        self.out.push_str(FIELD_ANNOTATION_PREFIX);
        self.text("v", &field.variant);
        self.text("lbl", &field.display_label);
        let image_src = field
            .image_src
            .as_deref()
            .map(|src| src.chars().take(IMAGE_SRC_PREFIX_CHARS).collect::<String>());
        self.opt_text("img", image_src.as_deref());
        self.opt_text("url", field.link_url.as_deref());
        self.opt_text("html", field.raw_html.as_deref());
        self.opt_text("ff", field.font_family.as_deref());
        self.opt("fs", field.font_size);
        self.opt_text("tc", field.text_color.as_deref());
        self.flag("hl", field.highlighted);
        self.flag("b", field.bold);
        self.flag("i", field.italic);
        self.flag("u", field.underline);
        self.flag("hid", field.hidden);
        self.opt_text("vis", field.visibility.as_deref());
        match &field.size {
            Some(size) => self.value("sz", format_args!("{}x{}", size.width, size.height)),
            None => self.out.push_str("sz=~;"),
        }
        self.marks(&field.marks);
        self.tracked_change(field.tracked_change.as_ref());
        self.comments(&field.comments);
    }

    fn marks(&mut self, marks: &RunMarks) {
        self.open("m");
        self.flag("b", marks.bold);
        self.flag("i", marks.italic);
        self.flag("u", marks.underline);
        self.flag("s", marks.strike);
        self.opt_text("c", marks.color.as_deref());
        self.opt("fs", marks.font_size);
        self.opt_text("ff", marks.font_family.as_deref());
        self.opt_text("hl", marks.highlight.as_deref());
        self.opt("ls", marks.letter_spacing);
        self.debug("tt", marks.text_transform);
        self.close();
    }

    fn tracked_change(&mut self, change: Option<&TrackedChange>) {
        let Some(change) = change else {
            self.out.push_str("tc=~;");
            return;
        };

        self.open("tc");
        self.value("k", change.kind.as_str());
        self.text("id", &change.id);
        self.opt_text("a", change.author.as_deref());
        self.opt_text("d", change.date.as_deref());
        self.snapshots("before", &change.before);
        self.snapshots("after", &change.after);
        self.close();
    }

    fn snapshots(&mut self, name: &str, snapshots: &[MarkSnapshot]) {
        self.open(name);
        for snapshot in snapshots {
            self.text("t", &snapshot.mark_type);
            // BTreeMap iteration is ordered, which keeps this deterministic.
            for (key, value) in &snapshot.attrs {
                self.text("k", key);
                self.text("v", value);
            }
            self.out.push('/');
        }
        self.close();
    }

    fn comments(&mut self, comments: &[CommentAnnotation]) {
        self.open("cm");
        for comment in comments {
            self.text("id", &comment.id);
            self.flag("int", comment.internal);
        }
        self.close();
    }

    fn table(&mut self, table: &TableBlock) {
        self.open("tbl");

        match &table.attrs.borders {
            Some(borders) => {
                self.open("bd");
                self.border("t", borders.top.as_ref());
                self.border("r", borders.right.as_ref());
                self.border("b", borders.bottom.as_ref());
                self.border("l", borders.left.as_ref());
                self.border("ih", borders.inside_h.as_ref());
                self.border("iv", borders.inside_v.as_ref());
                self.close();
            }
            None => self.out.push_str("bd=~;"),
        }
        self.debug("bc", table.attrs.border_collapse);
        self.opt("csp", table.attrs.cell_spacing);

        for row in &table.rows {
            self.open("row");
            self.opt("h", row.height);
            for cell in &row.cells {
                self.cell(cell);
            }
            self.close();
        }

        self.close();
    }

    fn cell(&mut self, cell: &TableCell) {
        self.open("cell");

        let attrs = &cell.attrs;
        match &attrs.borders {
            Some(borders) => {
                self.open("bd");
                self.border("t", borders.top.as_ref());
                self.border("r", borders.right.as_ref());
                self.border("b", borders.bottom.as_ref());
                self.border("l", borders.left.as_ref());
                self.close();
            }
            None => self.out.push_str("bd=~;"),
        }
        self.box_spacing("pad", attrs.padding.as_ref());
        self.debug("va", attrs.vertical_align);
        self.opt_text("bg", attrs.background.as_deref());

        for block in &cell.blocks {
            self.block(block);
        }
        if let Some(paragraph) = &cell.paragraph {
            self.out.push_str("legacy:");
            self.paragraph(paragraph);
        }

        self.close();
    }

    fn anchor(&mut self, anchor: Option<&Anchor>) {
        let Some(anchor) = anchor else {
            self.out.push_str("an=~;");
            return;
        };
        self.open("an");
        self.flag("a", anchor.is_anchored);
        self.opt_text("hr", anchor.h_relative_from.as_deref());
        self.opt_text("vr", anchor.v_relative_from.as_deref());
        self.value("oh", anchor.offset_h);
        self.value("ov", anchor.offset_v);
        self.flag("bh", anchor.behind_doc);
        self.close();
    }

    fn wrap(&mut self, wrap: Option<&Wrap>) {
        let Some(wrap) = wrap else {
            self.out.push_str("wr=~;");
            return;
        };
        self.open("wr");
        self.value("m", format_args!("{:?}", wrap.mode));
        self.opt_text("t", wrap.wrap_text.as_deref());
        self.box_spacing("d", wrap.distances.as_ref());
        self.close();
    }

    fn geometry(&mut self, name: &str, geometry: &Geometry) {
        let _ = write!(
            self.out,
            "{name}={}x{}@{}:{}{};",
            geometry.width,
            geometry.height,
            geometry.rotation,
            u8::from(geometry.flip_h),
            u8::from(geometry.flip_v)
        );
    }

    fn image_block(&mut self, image: &ImageBlock) {
        self.open("image");
        let src: String = image.src.chars().take(IMAGE_SRC_PREFIX_CHARS).collect();
        self.text("src", &src);
        self.value("sz", format_args!("{}x{}", image.width, image.height));
        self.anchor(image.anchor.as_ref());
        self.wrap(image.wrap.as_ref());
        self.box_spacing("mg", image.margin.as_ref());
        self.box_spacing("pd", image.padding.as_ref());
        self.opt_text("fit", image.object_fit.as_deref());
        self.opt("rot", image.rotation);
        self.close();
    }

    fn vector_shape(&mut self, shape: &VectorShape) {
        self.text("k", &shape.shape_kind);
        self.opt_text("fill", shape.fill.as_deref());
        self.opt_text("sc", shape.stroke_color.as_deref());
        self.opt("sw", shape.stroke_width);
        self.opt_text("txt", shape.text.as_deref());
    }

    fn drawing_block(&mut self, drawing: &DrawingBlock) {
        self.open("drawing");
        self.geometry("g", &drawing.geometry);
        self.anchor(drawing.anchor.as_ref());
        self.wrap(drawing.wrap.as_ref());
        self.box_spacing("mg", drawing.margin.as_ref());
        self.box_spacing("pd", drawing.padding.as_ref());
        self.opt("z", drawing.z_index);

        match &drawing.content {
            DrawingContent::VectorShape(shape) => {
                self.open("shape");
                self.vector_shape(shape);
                self.close();
            }
            DrawingContent::ShapeGroup(group) => {
                self.open("group");
                match &group.transform {
                    Some(transform) => self.geometry("tf", transform),
                    None => self.out.push_str("tf=~;"),
                }
                for child in &group.children {
                    self.open("child");
                    self.geometry("g", &child.geometry);
                    self.value("at", format_args!("{},{}", child.offset_x, child.offset_y));
                    self.vector_shape(&child.shape);
                    self.close();
                }
                self.close();
            }
            DrawingContent::Image(image) => {
                self.open("img");
                let src: String = image.src.chars().take(IMAGE_SRC_PREFIX_CHARS).collect();
                self.text("src", &src);
                self.close();
            }
        }

        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(runs: Vec<Run>) -> ParagraphBlock {
        ParagraphBlock::new("p1", runs)
    }

    fn hash(paragraph: &ParagraphBlock) -> String {
        paragraph_fingerprint(paragraph)
    }

    #[test]
    fn test_run_prefixes_are_disjoint() {
        assert!(prefixes_are_disjoint(&RUN_KIND_PREFIXES));
        assert!(!prefixes_are_disjoint(&["t", "tab"]));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let block = FlowBlock::Paragraph(paragraph(vec![
            Run::styled("Hello ", RunMarks::default().bold()),
            Run::tab(),
            Run::text("world"),
        ]));

        assert_eq!(fingerprint(&block), fingerprint(&block));
        assert_eq!(fingerprint(&block), fingerprint(&block.clone()));
    }

    #[test]
    fn test_whitespace_is_not_normalized() {
        let single = paragraph(vec![Run::text("a b")]);
        let double = paragraph(vec![Run::text("a  b")]);
        let tab = paragraph(vec![Run::text("a\tb")]);

        assert_ne!(hash(&single), hash(&double));
        assert_ne!(hash(&single), hash(&tab));
    }

    #[test]
    fn test_run_order_matters() {
        let ab = paragraph(vec![Run::text("a"), Run::text("b")]);
        let ba = paragraph(vec![Run::text("b"), Run::text("a")]);
        assert_ne!(hash(&ab), hash(&ba));
    }

    #[test]
    fn test_run_boundaries_matter() {
        let joined = paragraph(vec![Run::text("ab")]);
        let split = paragraph(vec![Run::text("a"), Run::text("b")]);
        assert_ne!(hash(&joined), hash(&split));
    }

    #[test]
    fn test_text_cannot_forge_delimiters() {
        let forged = paragraph(vec![Run::text("a;|tx:1:b")]);
        let real = paragraph(vec![Run::text("a"), Run::text("b")]);
        assert_ne!(hash(&forged), hash(&real));
    }

    #[test]
    fn test_snapshot_keys_cannot_forge_delimiters() {
        let with_snapshot = |attrs: &[(&str, &str)]| {
            let snapshot = MarkSnapshot {
                mark_type: "bold".into(),
                attrs: attrs
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            };
            hash(&paragraph(vec![Run::Text(TextRun {
                text: "x".into(),
                tracked_change: Some(TrackedChange {
                    kind: TrackedChangeKind::Format,
                    before: vec![snapshot],
                    ..Default::default()
                }),
                ..Default::default()
            })]))
        };

        assert_ne!(
            with_snapshot(&[("a=1:x;b", "y")]),
            with_snapshot(&[("a", "x"), ("b", "y")])
        );
    }

    #[test]
    fn test_each_mark_changes_fingerprint() {
        let base = paragraph(vec![Run::text("text")]);
        let variants = [
            RunMarks::default().bold(),
            RunMarks::default().italic(),
            RunMarks::default().with_color("#FF0000"),
            RunMarks::default().with_font_size(18.),
            RunMarks::default().with_font_family("Georgia"),
            RunMarks {
                highlight: Some("yellow".into()),
                ..RunMarks::default()
            },
            RunMarks {
                text_transform: Some(TextTransform::Uppercase),
                ..RunMarks::default()
            },
        ];

        let base_hash = hash(&base);
        for marks in variants {
            let styled = paragraph(vec![Run::styled("text", marks.clone())]);
            assert_ne!(base_hash, hash(&styled), "marks {marks:?} were ignored");
        }
    }

    #[test]
    fn test_paragraph_attributes_change_fingerprint() {
        let base = paragraph(vec![Run::text("text")]);
        let base_hash = hash(&base);

        let variants = [
            ParagraphAttrs {
                alignment: Some(Alignment::Center),
                ..Default::default()
            },
            ParagraphAttrs {
                spacing: Some(Spacing {
                    line: Some(1.5),
                    line_rule: Some(LineRule::Auto),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ParagraphAttrs {
                indent: Some(Indent {
                    left: Some(36.),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ParagraphAttrs {
                borders: Some(ParagraphBorders {
                    bottom: Some(BorderSpec {
                        style: Some("single".into()),
                        width: Some(1.),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ParagraphAttrs {
                tabs: vec![TabStop {
                    pos: 1440.,
                    ..Default::default()
                }],
                ..Default::default()
            },
            ParagraphAttrs {
                rtl: true,
                ..Default::default()
            },
            ParagraphAttrs {
                keep_next: true,
                ..Default::default()
            },
            ParagraphAttrs {
                decimal_separator: Some(','),
                ..Default::default()
            },
            ParagraphAttrs {
                tracked_changes_mode: Some(TrackedChangesMode::Final),
                ..Default::default()
            },
        ];

        for attrs in variants {
            let changed = base.clone().with_attrs(attrs.clone());
            assert_ne!(base_hash, hash(&changed), "attrs {attrs:?} were ignored");
        }
    }

    #[test]
    fn test_list_marker_sentinels() {
        let none = paragraph(vec![Run::text("item")]);
        let empty = none.clone().with_attrs(ParagraphAttrs {
            list_marker: Some(ListMarker::default()),
            ..Default::default()
        });
        let bullet = none.clone().with_attrs(ParagraphAttrs {
            list_marker: Some(ListMarker {
                text: "1.".into(),
                ..Default::default()
            }),
            ..Default::default()
        });
        let other = none.clone().with_attrs(ParagraphAttrs {
            list_marker: Some(ListMarker {
                text: "2.".into(),
                ..Default::default()
            }),
            ..Default::default()
        });

        let hashes = [hash(&none), hash(&empty), hash(&bullet), hash(&other)];
        for i in 0..hashes.len() {
            for j in 0..hashes.len() {
                if i != j {
                    assert_ne!(hashes[i], hashes[j]);
                }
            }
        }
        assert!(hashes[0].contains("mk:none;"));
        assert!(hashes[1].contains("mk:empty;"));
    }

    #[test]
    fn test_tracked_change_and_comment_metadata() {
        let change = TrackedChange {
            kind: TrackedChangeKind::Insert,
            id: "tc-1".into(),
            author: Some("Ada".into()),
            date: Some("2024-01-01".into()),
            ..Default::default()
        };
        let with_change = |change: TrackedChange| {
            paragraph(vec![Run::Text(TextRun {
                text: "x".into(),
                tracked_change: Some(change),
                ..Default::default()
            })])
        };

        let base = hash(&with_change(change.clone()));
        let other_id = hash(&with_change(TrackedChange {
            id: "tc-2".into(),
            ..change.clone()
        }));
        let other_author = hash(&with_change(TrackedChange {
            author: Some("Grace".into()),
            ..change.clone()
        }));
        let mut snapshot = MarkSnapshot {
            mark_type: "bold".into(),
            ..Default::default()
        };
        snapshot.attrs.insert("value".into(), "true".into());
        let with_before = hash(&with_change(TrackedChange {
            kind: TrackedChangeKind::Format,
            before: vec![snapshot],
            ..change.clone()
        }));

        assert_ne!(base, other_id);
        assert_ne!(base, other_author);
        assert_ne!(base, with_before);

        let commented = |id: &str, internal: bool| {
            hash(&paragraph(vec![Run::Text(TextRun {
                text: "x".into(),
                comments: vec![CommentAnnotation {
                    id: id.into(),
                    internal,
                }],
                ..Default::default()
            })]))
        };
        assert_ne!(commented("c1", false), commented("c2", false));
        assert_ne!(commented("c1", false), commented("c1", true));
    }

    #[test]
    fn test_source_range_is_ignored() {
        let mut moved = paragraph(vec![Run::text("same")]);
        let original = moved.clone();
        moved.source_range = Some(SourceRange::new(40, 44));
        if let Run::Text(run) = &mut moved.runs[0] {
            run.source_range = Some(SourceRange::new(41, 45));
        }
        assert_eq!(hash(&original), hash(&moved));
    }

    #[test]
    fn test_image_run_hashes_bounded_source_prefix() {
        let long_src = format!("data:image/png;base64,{}", "A".repeat(10_000));
        let image = |src: &str, width: f32| {
            paragraph(vec![Run::Image(ImageRun {
                src: src.into(),
                width,
                height: 10.,
                ..Default::default()
            })])
        };

        let fingerprint = hash(&image(&long_src, 10.));
        assert!(fingerprint.len() < 500);
        assert_ne!(fingerprint, hash(&image(&long_src, 20.)));
    }

    #[test]
    fn test_field_annotation_differs_from_text() {
        let text = paragraph(vec![Run::text("Sign here")]);
        let field = paragraph(vec![Run::FieldAnnotation(FieldAnnotationRun {
            variant: "signature".into(),
            display_label: "Sign here".into(),
            ..Default::default()
        })]);
        assert_ne!(hash(&text), hash(&field));

        let hidden = paragraph(vec![Run::FieldAnnotation(FieldAnnotationRun {
            variant: "signature".into(),
            display_label: "Sign here".into(),
            hidden: true,
            ..Default::default()
        })]);
        assert_ne!(hash(&field), hash(&hidden));
    }

    #[test]
    fn test_table_recurses_into_cells() {
        let cell = |text: &str| TableCell::new(vec![paragraph(vec![Run::text(text)]).into()]);
        let table = |text: &str| TableBlock {
            id: "t1".into(),
            rows: vec![TableRow {
                cells: vec![cell("a"), cell(text)],
                height: None,
            }],
            ..Default::default()
        };

        assert_eq!(table_fingerprint(&table("b")), table_fingerprint(&table("b")));
        assert_ne!(table_fingerprint(&table("b")), table_fingerprint(&table("c")));
    }

    #[test]
    fn test_table_legacy_cell_shape_and_cell_attrs() {
        let legacy = |background: Option<&str>| TableBlock {
            id: "t1".into(),
            rows: vec![TableRow {
                cells: vec![TableCell {
                    paragraph: Some(paragraph(vec![Run::text("legacy")])),
                    attrs: CellAttrs {
                        background: background.map(Into::into),
                        ..Default::default()
                    },
                    ..Default::default()
                }],
                height: None,
            }],
            ..Default::default()
        };

        let plain = table_fingerprint(&legacy(None));
        assert!(plain.contains("legacy:"));
        assert_ne!(plain, table_fingerprint(&legacy(Some("#EEEEEE"))));
    }

    #[test]
    fn test_empty_table_does_not_panic() {
        let table = TableBlock::default();
        let first = table_fingerprint(&table);
        assert_eq!(first, table_fingerprint(&table));

        let with_empty_row = TableBlock {
            rows: vec![TableRow::default()],
            ..Default::default()
        };
        assert_ne!(first, table_fingerprint(&with_empty_row));
    }

    #[test]
    fn test_drawing_content_changes_fingerprint() {
        let shape = |fill: &str| {
            FlowBlock::Drawing(DrawingBlock {
                id: "d1".into(),
                content: DrawingContent::VectorShape(VectorShape {
                    shape_kind: "rect".into(),
                    fill: Some(fill.into()),
                    ..Default::default()
                }),
                ..Default::default()
            })
        };
        assert_ne!(fingerprint(&shape("#000")), fingerprint(&shape("#FFF")));
    }
}
