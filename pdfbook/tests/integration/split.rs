//! Integration tests for booklet splitting.

use pdfbook::config::{CompressionLevel, OverwriteMode, SplitConfig};
use pdfbook::pages::MetadataManager;
use lopdf::dictionary;
use pdfbook::split::split_pdf;
use rstest::rstest;
use std::path::Path;
use tempfile::TempDir;

use crate::common::{
    bookmarked_pdf, page_count, page_labels, page_object_count, quiet_options, write_labelled_pdf,
};

fn split_config(dir: &Path, input: &Path) -> SplitConfig {
    SplitConfig {
        input: input.to_path_buf(),
        first_output: dir.join("first.pdf"),
        second_output: dir.join("second.pdf"),
        output: quiet_options(OverwriteMode::Force),
    }
}

#[tokio::test]
async fn test_split_six_pages() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", 6);
    let config = split_config(temp_dir.path(), &input);

    let stats = split_pdf(&config).await.unwrap();

    assert_eq!(stats.source_pages, 6);
    assert_eq!(stats.blank_pages_added, 2);
    assert_eq!(stats.outputs.len(), 2);
    assert_eq!(
        page_labels(&config.first_output),
        ["P8-blank", "P1", "P2", "P7-blank"]
    );
    assert_eq!(page_labels(&config.second_output), ["P3", "P6", "P4", "P5"]);

    // source untouched on disk
    assert_eq!(page_labels(&input), ["P1", "P2", "P3", "P4", "P5", "P6"]);
}

#[tokio::test]
async fn test_split_halves_only_carry_their_own_pages() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("bookmarked.pdf");
    bookmarked_pdf(8).save(&input).unwrap();
    let config = split_config(temp_dir.path(), &input);

    split_pdf(&config).await.unwrap();

    for output in config.outputs() {
        assert_eq!(page_count(output), 4);
        assert_eq!(page_object_count(output), 4);
    }
    assert_eq!(page_object_count(&input), 8);
}

#[tokio::test]
async fn test_split_sixteen_pages() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", 16);
    let config = split_config(temp_dir.path(), &input);

    let stats = split_pdf(&config).await.unwrap();

    assert_eq!(stats.blank_pages_added, 0);
    assert_eq!(
        page_labels(&config.first_output),
        ["P16", "P1", "P2", "P15", "P14", "P3", "P4", "P13"]
    );
    assert_eq!(
        page_labels(&config.second_output),
        ["P5", "P12", "P6", "P11", "P7", "P10", "P8", "P9"]
    );
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(8)]
#[case(9)]
#[case(17)]
#[tokio::test]
async fn test_every_page_appears_once(#[case] pages: usize) {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", pages);
    let config = split_config(temp_dir.path(), &input);

    let stats = split_pdf(&config).await.unwrap();
    let padded = pages.div_ceil(8) * 8;

    let mut seen = page_labels(&config.first_output);
    seen.extend(page_labels(&config.second_output));
    seen.sort();

    let mut expected: Vec<String> = (1..=pages).map(|n| format!("P{n}")).collect();
    expected.extend((pages + 1..=padded).map(|n| format!("P{n}-blank")));
    expected.sort();

    assert_eq!(seen, expected);
    assert_eq!(stats.first_pages, padded / 2);
    assert_eq!(stats.second_pages, padded / 2);
}

#[tokio::test]
async fn test_split_empty_document() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "empty.pdf", 0);
    let config = split_config(temp_dir.path(), &input);

    let stats = split_pdf(&config).await.unwrap();

    assert_eq!(stats.padded_pages(), 0);
    assert_eq!(page_count(&config.first_output), 0);
    assert_eq!(page_count(&config.second_output), 0);
}

#[tokio::test]
async fn test_split_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", 3);
    let mut config = split_config(temp_dir.path(), &input);
    config.output.dry_run = true;

    let stats = split_pdf(&config).await.unwrap();

    assert_eq!(stats.blank_pages_added, 5);
    assert!(stats.outputs.is_empty());
    assert!(!config.first_output.exists());
    assert!(!config.second_output.exists());
}

#[tokio::test]
async fn test_split_default_output_names() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "javascript.pdf", 8);
    let mut config = SplitConfig::with_default_outputs(&input);
    config.output = quiet_options(OverwriteMode::NoClobber);

    split_pdf(&config).await.unwrap();

    assert!(temp_dir.path().join("javascript_part1.pdf").exists());
    assert!(temp_dir.path().join("javascript_part2.pdf").exists());
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Maximum)]
#[tokio::test]
async fn test_split_compression_levels(#[case] compression: CompressionLevel) {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", 6);
    let mut config = split_config(temp_dir.path(), &input);
    config.output.compression = compression;

    let stats = split_pdf(&config).await.unwrap();

    assert_eq!(stats.outputs[0].compressed, compression.compresses());
    assert_eq!(page_labels(&config.second_output), ["P3", "P6", "P4", "P5"]);
}

#[tokio::test]
async fn test_split_titles_halves() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("titled.pdf");
    let mut doc = crate::common::labelled_pdf(4);
    let info_id = doc.add_object(lopdf::dictionary! {
        "Title" => lopdf::Object::string_literal("Eloquent"),
    });
    doc.trailer.set("Info", info_id);
    doc.save(&input).unwrap();
    let config = split_config(temp_dir.path(), &input);

    split_pdf(&config).await.unwrap();

    let metadata = MetadataManager::new();
    let first = lopdf::Document::load(&config.first_output).unwrap();
    let second = lopdf::Document::load(&config.second_output).unwrap();
    assert_eq!(metadata.title(&first).as_deref(), Some("Eloquent (part 1)"));
    assert_eq!(metadata.title(&second).as_deref(), Some("Eloquent (part 2)"));
    assert_eq!(metadata.field(&first, b"Producer").as_deref(), Some("pdfbook"));
}

#[tokio::test]
async fn test_split_keeps_utf16_title() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("titled.pdf");
    let mut doc = crate::common::labelled_pdf(4);
    let title: Vec<u8> = [0xFE, 0xFF]
        .into_iter()
        .chain("Lição".encode_utf16().flat_map(u16::to_be_bytes))
        .collect();
    let info_id = doc.add_object(lopdf::dictionary! {
        "Title" => lopdf::Object::String(title, lopdf::StringFormat::Hexadecimal),
    });
    doc.trailer.set("Info", info_id);
    doc.save(&input).unwrap();
    let config = split_config(temp_dir.path(), &input);

    split_pdf(&config).await.unwrap();

    let metadata = MetadataManager::new();
    let first = lopdf::Document::load(&config.first_output).unwrap();
    assert_eq!(metadata.title(&first).as_deref(), Some("Lição (part 1)"));
}
