//! Input and output validation for pdfbook.
//!
//! This module checks files before any PDF work starts. It performs:
//! - File existence and accessibility checks
//! - PDF header detection
//! - Output path validation and overwrite policy
//!
//! # Examples
//!
//! ```no_run
//! use pdfbook::validation::Validator;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = Validator::new();
//! let input = validator.validate_input(Path::new("book.pdf")).await?;
//! println!("PDF {} ({} bytes)", input.version, input.file_size);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

use crate::config::OverwriteMode;
use crate::error::{PdfBookError, Result};
use crate::io::PdfWriter;
use crate::utils::{format_file_size, pdf_header_version};

/// Result of validating a single input file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputCheck {
    /// Path to the validated file.
    pub path: PathBuf,

    /// Version from the `%PDF-` header.
    pub version: String,

    /// Size of the file in bytes.
    pub file_size: u64,
}

impl InputCheck {
    /// Format the file size as a human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Validator for input files and output targets.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    writer: PdfWriter,
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a single input file.
    ///
    /// Only the file header is read; full parsing happens on load.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist
    /// - Path is not a regular file
    /// - File is not accessible
    /// - File is empty or lacks a `%PDF-` header
    pub async fn validate_input(&self, path: &Path) -> Result<InputCheck> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PdfBookError::file_not_found(path.to_path_buf())
            } else {
                PdfBookError::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_file() {
            return Err(PdfBookError::not_a_file(path.to_path_buf()));
        }

        if metadata.len() == 0 {
            return Err(PdfBookError::corrupted_pdf(
                path.to_path_buf(),
                "File is empty",
            ));
        }

        let mut head = Vec::with_capacity(1024);
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| PdfBookError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            })?;
        file.take(1024)
            .read_to_end(&mut head)
            .await
            .map_err(|e| PdfBookError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            })?;

        let version = pdf_header_version(&head).ok_or_else(|| {
            PdfBookError::corrupted_pdf(path.to_path_buf(), "Missing %PDF- header")
        })?;

        Ok(InputCheck {
            path: path.to_path_buf(),
            version,
            file_size: metadata.len(),
        })
    }

    /// Validate every input, stopping at the first failure.
    pub async fn validate_inputs(&self, paths: &[&Path]) -> Result<Vec<InputCheck>> {
        let mut checks = Vec::with_capacity(paths.len());
        for path in paths {
            checks.push(self.validate_input(path).await?);
        }
        Ok(checks)
    }

    /// Validate output targets against the inputs and the overwrite policy.
    ///
    /// `Prompt` is accepted here; asking the user is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An output equals an input or another output
    /// - An output exists and `mode` is `NoClobber`
    /// - An output directory doesn't exist or is not writable
    pub async fn validate_outputs(
        &self,
        inputs: &[&Path],
        outputs: &[&Path],
        mode: OverwriteMode,
    ) -> Result<()> {
        for (index, output) in outputs.iter().enumerate() {
            if inputs.contains(output) || same_file(inputs, output) {
                return Err(PdfBookError::invalid_config(format!(
                    "Output file cannot be the same as an input file: {}",
                    output.display()
                )));
            }

            if outputs[..index].contains(output) {
                return Err(PdfBookError::invalid_config(format!(
                    "Output file given more than once: {}",
                    output.display()
                )));
            }

            if mode == OverwriteMode::NoClobber && self.writer.exists(output).await {
                return Err(PdfBookError::output_exists(output.to_path_buf()));
            }

            self.writer.can_write(output).await?;
        }

        Ok(())
    }
}

/// Whether `output` resolves to the same file as one of `inputs`.
fn same_file(inputs: &[&Path], output: &Path) -> bool {
    let Ok(output) = output.canonicalize() else {
        return false;
    };
    inputs
        .iter()
        .filter_map(|input| input.canonicalize().ok())
        .any(|input| input == output)
}
