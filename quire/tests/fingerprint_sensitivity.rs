// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use quire::fingerprint;
use quire::model::*;

fn base() -> ParagraphBlock {
    ParagraphBlock::new(
        "p1",
        vec![
            Run::styled("Hello ", RunMarks::default().with_font_size(16.)),
            Run::Text(TextRun {
                text: "world".to_string(),
                marks: RunMarks::default().with_font_size(16.),
                tracked_change: Some(TrackedChange {
                    kind: TrackedChangeKind::Insert,
                    id: "tc-1".to_string(),
                    author: Some("Ada".to_string()),
                    ..Default::default()
                }),
                comments: vec![CommentAnnotation {
                    id: "c-1".to_string(),
                    internal: false,
                }],
                source_range: None,
            }),
        ],
    )
    .with_attrs(ParagraphAttrs {
        list_marker: Some(ListMarker {
            text: "1.".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn text_run(paragraph: &mut ParagraphBlock, index: usize) -> &mut TextRun {
    match &mut paragraph.runs[index] {
        Run::Text(run) => run,
        other => panic!("expected a text run, got {}", other.kind_name()),
    }
}

type Mutation = fn(&mut ParagraphBlock);

fn print(paragraph: ParagraphBlock) -> String {
    fingerprint(&FlowBlock::Paragraph(paragraph))
}

#[test]
fn fingerprint_is_deterministic() {
    assert_eq!(print(base()), print(base()));
}

#[test]
fn every_rendering_dimension_changes_the_fingerprint() {
    let mutations: &[(&str, Mutation)] = &[
        ("whitespace", |p| text_run(p, 0).text = "Hello  ".to_string()),
        ("bold", |p| text_run(p, 0).marks.bold = true),
        ("color", |p| text_run(p, 0).marks.color = Some("#ff0000".to_string())),
        ("font size", |p| text_run(p, 1).marks.font_size = Some(18.)),
        ("alignment", |p| p.attrs.alignment = Some(Alignment::Center)),
        ("spacing", |p| {
            p.attrs.spacing = Some(Spacing {
                after: Some(12.),
                ..Default::default()
            })
        }),
        ("indent", |p| {
            p.attrs.indent = Some(Indent {
                left: Some(24.),
                ..Default::default()
            })
        }),
        ("borders", |p| {
            p.attrs.borders = Some(ParagraphBorders {
                bottom: Some(BorderSpec {
                    style: Some("single".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }),
        ("tracked change id", |p| {
            if let Some(change) = text_run(p, 1).tracked_change.as_mut() {
                change.id = "tc-2".to_string();
            }
        }),
        ("comment id", |p| text_run(p, 1).comments[0].id = "c-2".to_string()),
        ("marker text", |p| {
            if let Some(marker) = p.attrs.list_marker.as_mut() {
                marker.text = "2.".to_string();
            }
        }),
    ];

    let original = print(base());
    for (name, mutate) in mutations {
        let mut paragraph = base();
        mutate(&mut paragraph);
        assert_ne!(print(paragraph), original, "{name} did not change the fingerprint");
    }
}

#[test]
fn marker_states_are_distinct() {
    let with_marker = |marker: Option<&str>| {
        let mut paragraph = base();
        paragraph.attrs.list_marker = marker.map(|text| ListMarker {
            text: text.to_string(),
            ..Default::default()
        });
        print(paragraph)
    };

    let none = with_marker(None);
    let empty = with_marker(Some(""));
    let text = with_marker(Some("a)"));
    assert_ne!(none, empty);
    assert_ne!(empty, text);
    assert_ne!(none, text);
}

#[test]
fn source_positions_do_not_change_the_fingerprint() {
    let mut shifted = base();
    shifted.source_range = Some(SourceRange::new(120, 180));
    text_run(&mut shifted, 0).source_range = Some(SourceRange::new(121, 127));
    assert_eq!(print(shifted), print(base()));
}

#[test]
fn tables_hash_nested_paragraphs() {
    let table = |text: &str| {
        FlowBlock::Table(TableBlock {
            id: "t1".to_string(),
            rows: vec![TableRow {
                cells: vec![TableCell::new(vec![FlowBlock::Paragraph(
                    ParagraphBlock::new("cell-p", vec![Run::text(text)]),
                )])],
                ..Default::default()
            }],
            ..Default::default()
        })
    };

    assert_eq!(fingerprint(&table("a")), fingerprint(&table("a")));
    assert_ne!(fingerprint(&table("a")), fingerprint(&table("b")));

    let empty = FlowBlock::Table(TableBlock::default());
    assert_eq!(fingerprint(&empty), fingerprint(&empty));
}
