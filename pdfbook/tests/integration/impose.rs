//! Integration tests for four-up imposition of split halves.

use lopdf::{Document, Object};
use pdfbook::config::{ImposeConfig, OverwriteMode, SplitConfig};
use pdfbook::error::PdfBookError;
use pdfbook::impose::impose_pdfs;
use pdfbook::split::split_pdf;
use tempfile::TempDir;

use crate::common::{page_count, quiet_options, write_labelled_pdf};

/// XObject names drawn on each sheet of `doc`, in page order.
fn forms_per_sheet(doc: &Document) -> Vec<usize> {
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_dictionary(page_id).unwrap();
            let resources = match page.get(b"Resources").unwrap() {
                Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
                Object::Dictionary(dict) => dict,
                other => panic!("unexpected resources {other:?}"),
            };
            match resources.get(b"XObject") {
                Ok(Object::Dictionary(xobjects)) => xobjects.len(),
                Ok(Object::Reference(id)) => doc.get_dictionary(*id).unwrap().len(),
                _ => 0,
            }
        })
        .collect()
}

#[tokio::test]
async fn test_split_then_impose() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", 11);

    let split = SplitConfig {
        input,
        first_output: temp_dir.path().join("part1.pdf"),
        second_output: temp_dir.path().join("part2.pdf"),
        output: quiet_options(OverwriteMode::Force),
    };
    split_pdf(&split).await.unwrap();

    let config = ImposeConfig {
        first: split.first_output.clone(),
        second: split.second_output.clone(),
        destination: temp_dir.path().join("sheets.pdf"),
        output: quiet_options(OverwriteMode::Force),
    };
    let stats = impose_pdfs(&config).await.unwrap();

    assert_eq!(stats.pages_per_half, 8);
    assert_eq!(stats.sheets, 4);
    assert!(stats.output.is_some());

    let sheets = Document::load(&config.destination).unwrap();
    assert_eq!(sheets.get_pages().len(), 4);
    assert_eq!(forms_per_sheet(&sheets), [4, 4, 4, 4]);
}

#[tokio::test]
async fn test_impose_unequal_halves() {
    let temp_dir = TempDir::new().unwrap();
    let config = ImposeConfig {
        first: write_labelled_pdf(temp_dir.path(), "a.pdf", 4),
        second: write_labelled_pdf(temp_dir.path(), "b.pdf", 6),
        destination: temp_dir.path().join("sheets.pdf"),
        output: quiet_options(OverwriteMode::Force),
    };

    let result = impose_pdfs(&config).await;

    assert!(matches!(
        result,
        Err(PdfBookError::PageCountMismatch {
            first: 4,
            second: 6
        })
    ));
    assert!(!config.destination.exists());
}

#[tokio::test]
async fn test_impose_dry_run() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = ImposeConfig {
        first: write_labelled_pdf(temp_dir.path(), "a.pdf", 3),
        second: write_labelled_pdf(temp_dir.path(), "b.pdf", 3),
        destination: temp_dir.path().join("sheets.pdf"),
        output: quiet_options(OverwriteMode::Force),
    };
    config.output.dry_run = true;

    let stats = impose_pdfs(&config).await.unwrap();

    assert_eq!(stats.sheets, 2);
    assert!(stats.output.is_none());
    assert!(!config.destination.exists());
}

#[tokio::test]
async fn test_impose_rejects_empty_halves() {
    let temp_dir = TempDir::new().unwrap();
    let config = ImposeConfig {
        first: write_labelled_pdf(temp_dir.path(), "a.pdf", 0),
        second: write_labelled_pdf(temp_dir.path(), "b.pdf", 2),
        destination: temp_dir.path().join("sheets.pdf"),
        output: quiet_options(OverwriteMode::Force),
    };

    // halves are loaded with verification, which rejects a page-less file
    let result = impose_pdfs(&config).await;

    assert!(matches!(result, Err(PdfBookError::CorruptedPdf { .. })));
    assert_eq!(page_count(&config.second), 2);
}
