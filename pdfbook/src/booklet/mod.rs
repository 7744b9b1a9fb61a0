//! Single-file four-up booklets.
//!
//! Instead of splitting a document into two halves, its pages are ordered
//! with [`booklet_order`] and imposed four to an A4 sheet in one output
//! file. Printed double-sided and cut, the sheets fold into a small
//! booklet.

pub mod sequence;

pub use sequence::{QUADRANTS, booklet_order, sheet_count};

use lopdf::Document;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::BookletConfig;
use crate::error::{PdfBookError, Result};
use crate::impose::Imposer;
use crate::io::{PdfReader, PdfWriter, WriteStatistics};
use crate::pages::{MetadataManager, PageExtractor};
use crate::validation::Validator;

/// Statistics about a booklet imposition.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookletStatistics {
    /// Pages in the source document.
    pub source_pages: usize,

    /// Sheets in the booklet.
    pub sheets: usize,

    /// Quadrants left empty on the last sheets.
    pub empty_quadrants: usize,

    /// Time taken to build the sheets.
    pub booklet_time: Duration,

    /// Written file. `None` on a dry run.
    pub output: Option<WriteStatistics>,
}

/// Impose every page of `doc` in booklet order. `doc` is not modified.
///
/// # Errors
///
/// Returns an error if the page tree or a page cannot be read.
pub fn impose_booklet(doc: &Document) -> Result<Document> {
    let pages = PageExtractor::new().page_ids(doc);
    Imposer::new().impose_sequence(doc, &booklet_order(&pages))
}

/// Impose the PDF named by `config` as a booklet and write it out.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the input cannot be
/// loaded or has no pages, or the output cannot be written.
pub async fn booklet_pdf(config: &BookletConfig) -> Result<BookletStatistics> {
    config
        .validate()
        .map_err(|e| PdfBookError::invalid_config(e.to_string()))?;

    Validator::new()
        .validate_outputs(
            &[config.input.as_path()],
            &[config.destination.as_path()],
            config.output.overwrite_mode,
        )
        .await?;

    let loaded = PdfReader::new().load(&config.input).await?;

    let (document, mut statistics) = task::spawn_blocking(move || {
        let start = Instant::now();
        let mut document = impose_booklet(&loaded.document)?;
        MetadataManager::new().stamp(&mut document, None)?;

        let sheets = sheet_count(loaded.page_count);
        let statistics = BookletStatistics {
            source_pages: loaded.page_count,
            sheets,
            empty_quadrants: sheets * QUADRANTS - loaded.page_count,
            booklet_time: start.elapsed(),
            output: None,
        };
        Ok::<_, PdfBookError>((document, statistics))
    })
    .await
    .map_err(|e| PdfBookError::other(format!("Booklet task failed: {e}")))??;

    log::debug!(
        "Imposed {} as a booklet: {} pages on {} sheets",
        config.input.display(),
        statistics.source_pages,
        statistics.sheets
    );

    if !config.output.dry_run {
        let writer = PdfWriter::with_compression(config.output.compression);
        statistics.output = Some(writer.save_with_stats(&document, &config.destination).await?);
    }

    Ok(statistics)
}
