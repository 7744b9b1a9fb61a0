//! Booklet splitting.
//!
//! A document is padded with labelled blank pages to a multiple of eight and
//! divided into two halves that, printed and stacked, fold into booklets.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbook::config::SplitConfig;
//! use pdfbook::split::split_pdf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SplitConfig::with_default_outputs("javascript.pdf");
//! let stats = split_pdf(&config).await?;
//! println!(
//!     "{} pages + {} blank -> {} / {}",
//!     stats.source_pages, stats.blank_pages_added, stats.first_pages, stats.second_pages
//! );
//! # Ok(())
//! # }
//! ```

pub mod layout;
pub mod splitter;

pub use layout::{Partition, SHEET_PAGES, padded_len, partition};
pub use splitter::{SplitOutput, SplitStatistics, Splitter};

use lopdf::Document;
use tokio::task;

use crate::config::SplitConfig;
use crate::error::{PdfBookError, Result};
use crate::io::{PdfReader, PdfWriter};
use crate::pages::MetadataManager;
use crate::validation::Validator;

/// Split the PDF named by `config` and write both halves.
///
/// Either both output files are written or neither is. On a dry run the
/// split is still computed, so the returned statistics are exact, but no
/// file is created.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - An output exists and the overwrite mode is `NoClobber`
/// - The input cannot be loaded
/// - Either half cannot be written
pub async fn split_pdf(config: &SplitConfig) -> Result<SplitStatistics> {
    config
        .validate()
        .map_err(|e| PdfBookError::invalid_config(e.to_string()))?;

    Validator::new()
        .validate_outputs(
            &[config.input.as_path()],
            &config.outputs(),
            config.output.overwrite_mode,
        )
        .await?;

    let loaded = PdfReader::without_verification()
        .load(&config.input)
        .await?;
    let input_size = loaded.file_size;

    let mut output = task::spawn_blocking(move || {
        let mut output = Splitter::new().split_document(&loaded.document)?;
        stamp_halves(&loaded.document, &mut output)?;
        Ok::<_, PdfBookError>(output)
    })
    .await
    .map_err(|e| PdfBookError::other(format!("Split task failed: {e}")))??;

    output.statistics.input_size = input_size;

    if config.output.dry_run {
        return Ok(output.statistics);
    }

    let writer = PdfWriter::with_compression(config.output.compression);
    output.statistics.outputs = writer
        .save_all(&[
            (&output.first, config.first_output.as_path()),
            (&output.second, config.second_output.as_path()),
        ])
        .await?;

    Ok(output.statistics)
}

/// Stamp both halves, deriving their titles from the source title.
fn stamp_halves(source: &Document, output: &mut SplitOutput) -> Result<()> {
    let metadata = MetadataManager::new();
    let title = metadata.title(source);

    for (part, doc) in [(1, &mut output.first), (2, &mut output.second)] {
        let part_title = title.as_ref().map(|t| format!("{t} (part {part})"));
        metadata.stamp(doc, part_title.as_deref())?;
    }

    Ok(())
}
