//! Integration tests for batch processing.

mod common;

use std::fs;
use std::path::PathBuf;

use common::{build_pdf, Row};
use pdf_outline::batch::collect_pdfs;
use pdf_outline::{BatchOptions, BatchProcessor, DocumentStatus, JsonFormat, Outline};

fn sample_pdf(title: &'static str) -> Vec<u8> {
    let mut rows: Vec<Row> = vec![
        (title, 24.0, false, 80.0),
        ("1. Overview", 18.0, true, 140.0),
    ];
    for i in 0..6 {
        rows.push((
            "Body text describing the work in some detail.",
            11.0,
            false,
            176.0 + i as f32 * 14.0,
        ));
    }
    build_pdf(&[Some(rows)])
}

#[test]
fn test_collect_pdfs_sorted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.pdf"), b"").unwrap();
    fs::write(dir.path().join("A.PDF"), b"").unwrap();
    fs::write(dir.path().join("notes.txt"), b"").unwrap();
    fs::create_dir(dir.path().join("nested.pdf")).unwrap();

    let files = collect_pdfs(dir.path()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["A.PDF", "b.pdf"]);
}

#[test]
fn test_batch_writes_one_file_per_input() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("alpha.pdf"), sample_pdf("Alpha Programme Plan")).unwrap();
    fs::write(input.path().join("beta.pdf"), sample_pdf("Beta Site Survey")).unwrap();
    fs::write(input.path().join("broken.pdf"), b"%PDF-1.4 truncated").unwrap();

    let files = collect_pdfs(input.path()).unwrap();
    let processor = BatchProcessor::new(BatchOptions::new().with_output_dir(output.path()));
    let summary = processor.process(&files);

    assert_eq!(summary.outcomes.len(), 3);
    assert_eq!(summary.failed(), 0);
    assert_eq!(summary.total_headings(), 2);

    let alpha: Outline =
        serde_json::from_str(&fs::read_to_string(output.path().join("alpha.json")).unwrap())
            .unwrap();
    assert_eq!(alpha.title, "Alpha Programme Plan");
    assert_eq!(alpha.entries[0].text, "Overview");

    // Unreadable input still gets an output file with an empty outline
    let broken = &summary.outcomes[2];
    assert_eq!(broken.status, Some(DocumentStatus::Unreadable));
    let broken_json = fs::read_to_string(output.path().join("broken.json")).unwrap();
    let broken_outline: Outline = serde_json::from_str(&broken_json).unwrap();
    assert_eq!(broken_outline, Outline::new("broken"));
}

#[test]
fn test_sequential_matches_parallel() {
    let input = tempfile::tempdir().unwrap();
    for name in ["one", "two", "three"] {
        fs::write(
            input.path().join(format!("{}.pdf", name)),
            sample_pdf("Shared Report Title"),
        )
        .unwrap();
    }
    let files = collect_pdfs(input.path()).unwrap();

    let out_a = tempfile::tempdir().unwrap();
    let out_b = tempfile::tempdir().unwrap();
    BatchProcessor::new(BatchOptions::new().with_output_dir(out_a.path())).process(&files);
    BatchProcessor::new(
        BatchOptions::new()
            .with_output_dir(out_b.path())
            .sequential(),
    )
    .process(&files);

    for name in ["one", "two", "three"] {
        let file = format!("{}.json", name);
        assert_eq!(
            fs::read_to_string(out_a.path().join(&file)).unwrap(),
            fs::read_to_string(out_b.path().join(&file)).unwrap()
        );
    }
}

#[test]
fn test_missing_and_strict_failures_isolated() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("good.pdf"), sample_pdf("Good Document Title")).unwrap();
    fs::write(input.path().join("bad.pdf"), b"not a pdf at all").unwrap();

    let files: Vec<PathBuf> = vec![
        input.path().join("good.pdf"),
        input.path().join("bad.pdf"),
        input.path().join("missing.pdf"),
    ];
    let options = BatchOptions::new()
        .with_output_dir(output.path())
        .with_format(JsonFormat::Compact)
        .with_parse_options(pdf_outline::ParseOptions::new().strict());
    let summary = BatchProcessor::new(options).process(&files);

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 2);
    assert!(output.path().join("good.json").exists());
    assert!(!output.path().join("bad.json").exists());

    let compact = fs::read_to_string(output.path().join("good.json")).unwrap();
    assert_eq!(compact.lines().count(), 1);
}
