//! Integration tests for error handling and edge cases.

use pdfbook::config::{OverwriteMode, SplitConfig};
use pdfbook::error::PdfBookError;
use pdfbook::split::split_pdf;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::common::{quiet_options, write_labelled_pdf};

fn split_config(dir: &Path, input: PathBuf, mode: OverwriteMode) -> SplitConfig {
    SplitConfig {
        input,
        first_output: dir.join("first.pdf"),
        second_output: dir.join("second.pdf"),
        output: quiet_options(mode),
    }
}

fn assert_no_outputs(config: &SplitConfig) {
    for output in config.outputs() {
        assert!(!output.exists(), "{} should not exist", output.display());
    }
}

#[tokio::test]
async fn test_error_nonexistent_input() {
    let temp_dir = TempDir::new().unwrap();
    let config = split_config(
        temp_dir.path(),
        PathBuf::from("/nonexistent/file.pdf"),
        OverwriteMode::Force,
    );

    let err = split_pdf(&config).await.unwrap_err();

    assert!(matches!(err, PdfBookError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert_no_outputs(&config);
}

#[tokio::test]
async fn test_error_input_is_directory() {
    let temp_dir = TempDir::new().unwrap();
    let config = split_config(
        temp_dir.path(),
        temp_dir.path().to_path_buf(),
        OverwriteMode::Force,
    );

    let err = split_pdf(&config).await.unwrap_err();

    assert!(matches!(err, PdfBookError::NotAFile { .. }));
}

#[tokio::test]
async fn test_error_unreadable_pdf() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("garbage.pdf");
    std::fs::write(&input, b"this is not a pdf at all").unwrap();
    let config = split_config(temp_dir.path(), input, OverwriteMode::Force);

    let err = split_pdf(&config).await.unwrap_err();

    assert!(matches!(err, PdfBookError::FailedToLoadPdf { .. }));
    assert_eq!(err.exit_code(), 3);
    assert_no_outputs(&config);
}

#[tokio::test]
async fn test_error_output_same_as_input() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", 4);
    let mut config = split_config(temp_dir.path(), input.clone(), OverwriteMode::Force);
    config.second_output = input;

    let err = split_pdf(&config).await.unwrap_err();

    assert!(matches!(err, PdfBookError::InvalidConfig { .. }));
    assert!(!config.first_output.exists());
}

#[tokio::test]
async fn test_no_clobber_leaves_both_outputs_alone() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", 4);
    let config = split_config(temp_dir.path(), input, OverwriteMode::NoClobber);
    std::fs::write(&config.second_output, b"existing").unwrap();

    let err = split_pdf(&config).await.unwrap_err();

    assert!(matches!(err, PdfBookError::OutputExists { .. }));
    assert_eq!(err.exit_code(), 4);
    assert!(!config.first_output.exists());
    assert_eq!(std::fs::read(&config.second_output).unwrap(), b"existing");
}

#[tokio::test]
async fn test_missing_output_directory() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", 4);
    let mut config = split_config(temp_dir.path(), input, OverwriteMode::Force);
    config.second_output = temp_dir.path().join("missing").join("second.pdf");

    let result = split_pdf(&config).await;

    assert!(result.is_err());
    assert_no_outputs(&config);
}

#[tokio::test]
async fn test_force_replaces_existing_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_labelled_pdf(temp_dir.path(), "book.pdf", 4);
    let config = split_config(temp_dir.path(), input, OverwriteMode::Force);
    std::fs::write(&config.first_output, b"old").unwrap();

    split_pdf(&config).await.unwrap();

    let written = std::fs::read(&config.first_output).unwrap();
    assert!(written.starts_with(b"%PDF-"));
    // no temp files left behind
    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_invalid_quiet_and_verbose() {
    let mut config = SplitConfig::with_default_outputs("book.pdf");
    config.output.quiet = true;
    config.output.verbose = true;

    assert!(config.validate().is_err());
}
