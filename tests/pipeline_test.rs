//! End-to-end extraction tests over synthesized PDFs.

mod common;

use std::fs;

use common::{bold, build_pdf, models_with, rule_models, text, NoTitleBlock, Run, ShortBlock};
use pdf_outline::classify::{
    BLOCK_LABELS_FILE, BLOCK_MODEL_FILE, LEVEL_LABELS_FILE, LEVEL_MODEL_FILE,
};
use pdf_outline::render::{self, to_json};
use pdf_outline::{
    extract_bytes, extract_outline, EncoderOptions, Error, ExtractOptions, HeadingLevel,
    JsonFormat, Models, OutlineEntry, PdfSpanSource, SpanSource,
};

#[test]
fn test_title_and_single_heading() {
    let pdf = build_pdf(&[vec![
        bold("Document Title", 22, 720),
        bold("1. Introduction", 16, 680),
        text("This is body text.", 11, 650),
    ]]);

    let result = extract_bytes(&pdf, &rule_models()).unwrap();
    assert_eq!(
        to_json(&result, JsonFormat::Compact).unwrap(),
        r#"{"title":"Document Title","outline":[{"level":"H1","text":"1. Introduction","page":1}]}"#
    );
}

#[test]
fn test_title_fallback_picks_largest_first_page_text() {
    let pdf = build_pdf(&[
        vec![text("Small Word", 9, 720), text("Big Word", 30, 600)],
        vec![text("Even Bigger", 40, 700)],
    ]);

    let result = extract_bytes(&pdf, &models_with(NoTitleBlock)).unwrap();
    assert_eq!(result.title, "Big Word");
    assert!(result.outline.is_empty());
}

#[test]
fn test_title_fallback_tie_goes_to_topmost() {
    let pdf = build_pdf(&[vec![text("Lower", 18, 500), text("Upper", 18, 700)]]);

    let result = extract_bytes(&pdf, &models_with(NoTitleBlock)).unwrap();
    assert_eq!(result.title, "Upper");
}

#[test]
fn test_only_leading_duplicate_of_title_is_dropped() {
    let pdf = build_pdf(&[
        vec![bold("Overview", 24, 720), bold("Overview", 16, 680)],
        vec![bold("Details", 14, 700)],
        vec![bold("Overview", 16, 700)],
    ]);

    let result = extract_bytes(&pdf, &rule_models()).unwrap();
    assert_eq!(result.title, "Overview");
    assert_eq!(
        result.outline,
        vec![
            OutlineEntry::new(HeadingLevel::H2, "Details", 2),
            OutlineEntry::new(HeadingLevel::H1, "Overview", 3),
        ]
    );
}

#[test]
fn test_outline_follows_reading_order() {
    // Content streams list the lower heading first.
    let pdf = build_pdf(&[
        vec![
            bold("Second", 12, 400),
            bold("First", 12, 700),
            bold("Contents", 24, 750),
        ],
        vec![bold("Fourth", 16, 300), bold("Third", 14, 650)],
    ]);

    let result = extract_bytes(&pdf, &rule_models()).unwrap();
    assert_eq!(result.title, "Contents");
    let texts: Vec<&str> = result.outline.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["First", "Second", "Third", "Fourth"]);
    let pages: Vec<u32> = result.outline.iter().map(|e| e.page).collect();
    assert_eq!(pages, vec![1, 1, 2, 2]);
    assert_eq!(result.outline[2].level, HeadingLevel::H2);
    assert_eq!(result.outline[3].level, HeadingLevel::H1);
}

#[test]
fn test_document_without_text_yields_empty_result() {
    let pdf = build_pdf(&[vec![], vec![]]);

    let result = extract_bytes(&pdf, &rule_models()).unwrap();
    assert_eq!(
        to_json(&result, JsonFormat::Compact).unwrap(),
        r#"{"title":"","outline":[]}"#
    );
}

#[test]
fn test_extraction_is_idempotent() {
    let pdf = build_pdf(&[
        vec![bold("Annual Review", 26, 720), bold("Highlights", 15, 650)],
        vec![bold("Outlook", 13, 700), text("Body copy.", 10, 680)],
    ]);
    let models = rule_models();

    let first = to_json(&extract_bytes(&pdf, &models).unwrap(), JsonFormat::Pretty).unwrap();
    let second = to_json(&extract_bytes(&pdf, &models).unwrap(), JsonFormat::Pretty).unwrap();
    assert_eq!(first, second);
    assert!(render::validate_str(&first).is_empty());
}

#[test]
fn test_line_granularity_joins_spans_on_one_baseline() {
    let number = Run {
        x: 72,
        ..bold("1.", 16, 680)
    };
    let words = Run {
        x: 100,
        ..bold("Scope", 16, 680)
    };
    let pdf = build_pdf(&[vec![text("Handbook", 28, 740), number, words]]);
    let doc = PdfSpanSource::new().load_bytes(&pdf).unwrap();
    let models = models_with(NoTitleBlock);

    let spans = extract_outline(&doc, &models, &ExtractOptions::default()).unwrap();
    assert_eq!(spans.title, "Handbook");
    assert_eq!(spans.outline.len(), 2);

    let lines_options = ExtractOptions::new().with_encoder(EncoderOptions::new().lines());
    let lines = extract_outline(&doc, &models, &lines_options).unwrap();
    assert_eq!(
        lines.outline,
        vec![OutlineEntry::new(HeadingLevel::H1, "1. Scope", 1)]
    );
}

#[test]
fn test_malformed_classifier_output_is_an_error() {
    let pdf = build_pdf(&[vec![text("one", 12, 700), text("two", 12, 680)]]);

    let result = extract_bytes(&pdf, &models_with(ShortBlock));
    assert!(matches!(result, Err(Error::Classification(_))));
}

#[test]
fn test_softmax_models_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    // Title scores 3*size - 55, heading 8*bold, other a constant 4.
    fs::write(
        dir.path().join(BLOCK_MODEL_FILE),
        r#"{"weights": [[3,0,0,0],[0,8,0,0],[0,0,0,0]], "bias": [-55,0,4]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(BLOCK_LABELS_FILE),
        r#"["Title", "heading", "other"]"#,
    )
    .unwrap();
    // H1 scores size - 14, H3 scores 14 - size.
    fs::write(
        dir.path().join(LEVEL_MODEL_FILE),
        r#"{"weights": [[1,0,0,0],[0,0,0,0],[-1,0,0,0]], "bias": [-14,0,14]}"#,
    )
    .unwrap();
    fs::write(dir.path().join(LEVEL_LABELS_FILE), r#"["H1","H2","H3"]"#).unwrap();

    let models = Models::load(dir.path()).unwrap();
    let pdf = build_pdf(&[vec![
        bold("Document Title", 22, 720),
        bold("1. Introduction", 16, 680),
        bold("1.1 Background", 12, 640),
        text("This is body text.", 11, 600),
    ]]);

    let result = extract_bytes(&pdf, &models).unwrap();
    assert_eq!(result.title, "Document Title");
    assert_eq!(
        result.outline,
        vec![
            OutlineEntry::new(HeadingLevel::H1, "1. Introduction", 1),
            OutlineEntry::new(HeadingLevel::H3, "1.1 Background", 1),
        ]
    );
}
