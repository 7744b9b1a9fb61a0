//! Appending a single blank page.
//!
//! Used from the CLI on files and from the HTTP upload endpoint on bytes.

use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::AppendConfig;
use crate::error::{PdfBookError, Result};
use crate::io::{PdfReader, PdfWriter, WriteStatistics};
use crate::pages::{MetadataManager, PageExtractor};
use crate::validation::Validator;

/// Statistics about a blank-page append.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppendStatistics {
    /// Pages in the source document.
    pub source_pages: usize,

    /// Pages in the result.
    pub result_pages: usize,

    /// Time taken to build the result.
    pub append_time: Duration,

    /// Written file. `None` on a dry run.
    pub output: Option<WriteStatistics>,
}

/// Append one blank page to an in-memory PDF and serialize the result.
///
/// This is synchronous; call it from a blocking context.
pub fn append_blank_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let doc = PdfReader::without_verification().load_bytes(bytes)?;
    let mut result = PageExtractor::new().append_blank_page(&doc)?;
    MetadataManager::new().stamp(&mut result, None)?;
    PdfWriter::new().to_bytes(&result)
}

/// Append one blank page to the PDF named by `config` and write it out.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the input cannot be
/// loaded or the output cannot be written.
pub async fn append_blank_pdf(config: &AppendConfig) -> Result<AppendStatistics> {
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

    let loaded = PdfReader::without_verification()
        .load(&config.input)
        .await?;

    let (document, mut statistics) = task::spawn_blocking(move || {
        let start = Instant::now();
        let extractor = PageExtractor::new();
        let mut document = extractor.append_blank_page(&loaded.document)?;
        MetadataManager::new().stamp(&mut document, None)?;

        let statistics = AppendStatistics {
            source_pages: loaded.page_count,
            result_pages: extractor.page_count(&document),
            append_time: start.elapsed(),
            output: None,
        };
        Ok::<_, PdfBookError>((document, statistics))
    })
    .await
    .map_err(|e| PdfBookError::other(format!("Append task failed: {e}")))??;

    log::debug!(
        "Appended blank page to {}: {} -> {} pages",
        config.input.display(),
        statistics.source_pages,
        statistics.result_pages
    );

    if !config.output.dry_run {
        let writer = PdfWriter::with_compression(config.output.compression);
        statistics.output = Some(writer.save_with_stats(&document, &config.destination).await?);
    }

    Ok(statistics)
}
