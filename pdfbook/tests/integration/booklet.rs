//! Integration tests for single-file booklets.

use lopdf::content::Content;
use lopdf::{Document, Object};
use pdfbook::booklet::booklet_pdf;
use pdfbook::config::{BookletConfig, OverwriteMode};
use pdfbook::error::PdfBookError;
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{quiet_options, write_labelled_pdf};

/// Labels of the pages drawn on each sheet, in quadrant order.
fn sheet_labels(path: &std::path::Path) -> Vec<Vec<String>> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .into_values()
        .map(|sheet| {
            let page = doc.get_dictionary(sheet).unwrap();
            let xobjects = page
                .get(b"Resources")
                .and_then(Object::as_dict)
                .and_then(|resources| resources.get(b"XObject"))
                .and_then(Object::as_dict)
                .unwrap();

            let content = Content::decode(&doc.get_page_content(sheet).unwrap()).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Do")
                .map(|op| {
                    let name = op.operands[0].as_name().unwrap();
                    let form_id = xobjects.get(name).and_then(Object::as_reference).unwrap();
                    let form = doc.get_object(form_id).and_then(Object::as_stream).unwrap();
                    let bytes = form
                        .decompressed_content()
                        .unwrap_or_else(|_| form.content.clone());
                    form_label(&bytes)
                })
                .collect()
        })
        .collect()
}

fn form_label(content: &[u8]) -> String {
    Content::decode(content)
        .unwrap()
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

fn config(temp_dir: &TempDir, pages: usize) -> BookletConfig {
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", pages);
    BookletConfig {
        output: quiet_options(OverwriteMode::Force),
        ..BookletConfig::with_default_output(input)
    }
}

#[tokio::test]
async fn test_booklet_eight_pages() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir, 8);

    let stats = booklet_pdf(&config).await.unwrap();

    assert_eq!(stats.source_pages, 8);
    assert_eq!(stats.sheets, 2);
    assert_eq!(config.destination, temp_dir.path().join("book_booklet.pdf"));
    assert_eq!(
        sheet_labels(&config.destination),
        [["P2", "P7", "P4", "P5"], ["P8", "P1", "P6", "P3"]]
    );
}

#[tokio::test]
async fn test_booklet_sixteen_pages() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir, 16);

    let stats = booklet_pdf(&config).await.unwrap();

    assert_eq!(stats.sheets, 4);
    assert_eq!(stats.empty_quadrants, 0);
    assert_eq!(
        sheet_labels(&config.destination),
        [
            ["P2", "P15", "P4", "P13"],
            ["P16", "P1", "P14", "P3"],
            ["P6", "P11", "P8", "P9"],
            ["P12", "P5", "P10", "P7"],
        ]
    );
}

#[rstest]
#[case(1, 1)]
#[case(5, 2)]
#[case(10, 3)]
#[tokio::test]
async fn test_booklet_partial_sheets(#[case] pages: usize, #[case] sheets: usize) {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir, pages);

    let stats = booklet_pdf(&config).await.unwrap();
    let labels = sheet_labels(&config.destination);

    assert_eq!(stats.sheets, sheets);
    assert_eq!(labels.len(), sheets);
    assert_eq!(labels.iter().map(Vec::len).sum::<usize>(), pages);
}

#[tokio::test]
async fn test_booklet_dry_run() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config(&temp_dir, 6);
    config.output.dry_run = true;

    let stats = booklet_pdf(&config).await.unwrap();

    assert_eq!(stats.sheets, 2);
    assert_eq!(stats.empty_quadrants, 2);
    assert!(stats.output.is_none());
    assert!(!config.destination.exists());
}

#[tokio::test]
async fn test_booklet_no_clobber() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config(&temp_dir, 4);
    config.output.overwrite_mode = OverwriteMode::NoClobber;
    std::fs::write(&config.destination, b"keep me").unwrap();

    let result = booklet_pdf(&config).await;

    assert!(matches!(result, Err(PdfBookError::OutputExists { .. })));
    assert_eq!(std::fs::read(&config.destination).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_booklet_rejects_empty_input() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir, 0);

    let result = booklet_pdf(&config).await;

    assert!(matches!(result, Err(PdfBookError::CorruptedPdf { .. })));
    assert!(!config.destination.exists());
}
