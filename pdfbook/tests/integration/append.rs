//! Integration tests for appending a blank page.

use lopdf::Document;
use pdfbook::append::{append_blank_bytes, append_blank_pdf};
use pdfbook::config::{AppendConfig, OverwriteMode};
use pdfbook::error::PdfBookError;
use pdfbook::pages::{PageExtractor, PageSize};
use tempfile::TempDir;

use crate::common::{labelled_pdf, page_labels, quiet_options, write_labelled_pdf};

#[tokio::test]
async fn test_append_blank_page_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = AppendConfig {
        input: write_labelled_pdf(temp_dir.path(), "in.pdf", 3),
        destination: temp_dir.path().join("out.pdf"),
        output: quiet_options(OverwriteMode::Force),
    };

    let stats = append_blank_pdf(&config).await.unwrap();

    assert_eq!(stats.source_pages, 3);
    assert_eq!(stats.result_pages, 4);

    let labels = page_labels(&config.destination);
    assert_eq!(labels[..3], ["P1", "P2", "P3"]);
    assert_eq!(labels[3], "");
}

#[tokio::test]
async fn test_appended_page_matches_last_page_size() {
    let temp_dir = TempDir::new().unwrap();
    let config = AppendConfig {
        input: write_labelled_pdf(temp_dir.path(), "in.pdf", 2),
        destination: temp_dir.path().join("out.pdf"),
        output: quiet_options(OverwriteMode::Force),
    };

    append_blank_pdf(&config).await.unwrap();

    let doc = Document::load(&config.destination).unwrap();
    let extractor = PageExtractor::new();
    let last = *extractor.page_ids(&doc).last().unwrap();
    assert_eq!(
        extractor.page_size(&doc, last),
        Some(PageSize::new(612.0, 792.0))
    );
}

#[tokio::test]
async fn test_append_no_clobber() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("out.pdf");
    std::fs::write(&destination, b"keep me").unwrap();

    let config = AppendConfig {
        input: write_labelled_pdf(temp_dir.path(), "in.pdf", 1),
        destination: destination.clone(),
        output: quiet_options(OverwriteMode::NoClobber),
    };

    let result = append_blank_pdf(&config).await;

    assert!(matches!(result, Err(PdfBookError::OutputExists { .. })));
    assert_eq!(std::fs::read(&destination).unwrap(), b"keep me");
}

#[test]
fn test_append_blank_bytes_to_empty_document() {
    let mut buffer = Vec::new();
    labelled_pdf(0).save_to(&mut buffer).unwrap();

    let result = append_blank_bytes(&buffer).unwrap();
    let doc = Document::load_mem(&result).unwrap();

    let extractor = PageExtractor::new();
    let only = extractor.page_ids(&doc)[0];
    assert_eq!(doc.get_pages().len(), 1);
    assert_eq!(extractor.page_size(&doc, only), Some(PageSize::A4));
}
