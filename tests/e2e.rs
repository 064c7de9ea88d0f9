//! End-to-end integration tests for finsight.
//!
//! These tests use real PDF files in `./test_cases/` and make live LLM API
//! calls.  They are gated behind the `E2E_ENABLED` environment variable so
//! they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 GEMINI_API_KEY=... cargo test --test e2e -- --nocapture
//!
//! PDFium is located via `PDFIUM_LIB_PATH`, `./lib`, or the system path.

use finsight::pipeline::extract::{join_pages, PageTextSource};
use finsight::pipeline::input::read_upload;
use finsight::{
    analyze_bytes, analyze_path, AnalysisConfig, FinsightError, PdfiumTextSource, StepError,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn sample_report() -> PathBuf {
    test_cases_dir().join("sample-annual-report.pdf")
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            println!("       Place a text-based financial report at that path.");
            return;
        }
        p
    }};
}

// ── Extraction (PDFium only, no API key) ─────────────────────────────────────

#[tokio::test]
async fn test_extract_sample_report() {
    let path = e2e_skip_unless_ready!(sample_report());

    let doc = read_upload(&path.to_string_lossy(), 30).await.unwrap();
    let pages = PdfiumTextSource::default().page_texts(doc.bytes()).unwrap();
    assert!(!pages.is_empty(), "sample report has no pages");

    let text = join_pages(pages);
    println!("Extracted {} chars", text.chars().count());
    assert!(
        text.chars().count() > 100,
        "sample report should carry a text layer"
    );
}

#[tokio::test]
async fn test_missing_file_is_reported() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let err = read_upload("/nonexistent/report.pdf", 5).await.unwrap_err();
    assert!(matches!(err, FinsightError::FileNotFound { .. }));
}

// ── Live analysis ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_analyze_sample_report() {
    let path = e2e_skip_unless_ready!(sample_report());

    let config = AnalysisConfig::default();
    let result = analyze_path(path.to_string_lossy(), &config)
        .await
        .expect("analysis should succeed");

    let summary = result.executive_summary.as_deref().unwrap_or_default();
    println!("Summary: {summary}");
    assert!(!summary.trim().is_empty(), "summary is empty");

    let ratios: Vec<_> = result.ratios().collect();
    for (name, value) in &ratios {
        println!("  {name}: {value}");
    }
    assert_eq!(ratios.len(), 4, "expected the four requested ratios");
    assert!(result.extracted_data.is_some(), "no extracted_data");
}

#[tokio::test]
async fn test_blank_pdf_is_insufficient() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("blank.pdf"));

    let bytes = std::fs::read(&path).unwrap();
    let err = analyze_bytes("blank.pdf", bytes, &AnalysisConfig::default())
        .await
        .unwrap_err();

    match err {
        FinsightError::Step(StepError::InsufficientText { chars, .. }) => {
            assert!(chars <= 100);
        }
        other => panic!("expected InsufficientText, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_provider_is_fatal() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let config = AnalysisConfig::builder()
        .provider_name("finsight-nonexistent")
        .build()
        .unwrap();
    let err = analyze_path("/nonexistent/report.pdf", &config)
        .await
        .unwrap_err();
    assert!(
        matches!(err, FinsightError::ProviderNotConfigured { ref provider, .. } if provider == "finsight-nonexistent"),
        "got {err:?}"
    );
}
