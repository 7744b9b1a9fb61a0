//! PDF reading and loading operations.
//!
//! Documents are parsed on the blocking thread pool so the async runtime
//! (CLI or HTTP server) never stalls on a large file.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbook::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(Path::new("book.pdf")).await?;
//! println!("{} pages", loaded.page_count);
//! # Ok(())
//! # }
//! ```

use futures::future::try_join;
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PdfBookError, Result};
use crate::utils::format_file_size;

/// Label used in errors for documents that did not come from a file.
pub const IN_MEMORY_SOURCE: &str = "<upload>";

/// A loaded PDF document with metadata.
#[derive(Debug, Clone)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF reader with configurable loading behavior.
#[derive(Debug, Clone, Copy)]
pub struct PdfReader {
    /// Whether to reject documents without pages.
    verify: bool,
}

impl PdfReader {
    /// Create a new PDF reader that rejects documents without pages.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts documents without pages.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist or is not a regular file
    /// - File cannot be read
    /// - File is not a valid PDF
    /// - PDF is encrypted
    /// - PDF has no pages (unless verification is disabled)
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();

        let metadata = match tokio::fs::metadata(&path_buf).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PdfBookError::file_not_found(path_buf));
            }
            Err(e) => {
                return Err(PdfBookError::FileNotAccessible {
                    path: path_buf,
                    source: e,
                });
            }
        };

        if !metadata.is_file() {
            return Err(PdfBookError::not_a_file(path_buf));
        }

        let verify = self.verify;
        let start = Instant::now();

        let document = task::spawn_blocking({
            let path_buf = path_buf.clone();
            move || {
                let doc = Document::load(&path_buf)
                    .map_err(|e| PdfBookError::from_load_failure(path_buf.clone(), &e))?;
                check_document(&doc, &path_buf, verify)?;
                Ok::<_, PdfBookError>(doc)
            }
        })
        .await
        .map_err(|e| PdfBookError::other(format!("Load task failed: {e}")))??;

        let load_time = start.elapsed();
        let page_count = document.get_pages().len();
        log::debug!(
            "Loaded {} ({page_count} pages) in {load_time:?}",
            path_buf.display()
        );

        Ok(LoadedPdf {
            document,
            path: path_buf,
            page_count,
            load_time,
            file_size: metadata.len(),
        })
    }

    /// Load two documents concurrently, preserving argument order.
    ///
    /// Fails with the first error encountered.
    pub async fn load_pair(&self, first: &Path, second: &Path) -> Result<(LoadedPdf, LoadedPdf)> {
        try_join(self.load(first), self.load(second)).await
    }

    /// Parse a PDF held in memory.
    ///
    /// This is synchronous; call it from a blocking context.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<Document> {
        let label = PathBuf::from(IN_MEMORY_SOURCE);
        let doc = Document::load_mem(bytes)
            .map_err(|e| PdfBookError::from_load_failure(label.clone(), &e))?;
        check_document(&doc, &label, self.verify)?;
        Ok(doc)
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

fn check_document(doc: &Document, path: &Path, verify: bool) -> Result<()> {
    if doc.trailer.has(b"Encrypt") {
        return Err(PdfBookError::encrypted_pdf(path.to_path_buf()));
    }

    if verify && doc.get_pages().is_empty() {
        return Err(PdfBookError::corrupted_pdf(
            path.to_path_buf(),
            "PDF has no pages",
        ));
    }

    Ok(())
}
