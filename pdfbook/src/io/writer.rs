//! PDF writing and saving operations.
//!
//! This module provides safe PDF writing with:
//! - Atomic writes (write to temp file, then rename)
//! - All-or-nothing commits of several outputs at once
//! - Compression support
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfbook::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&doc, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::CompressionLevel;
use crate::error::{PdfBookError, Result};
use crate::utils::{format_file_size, temp_path};

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Compress content streams before writing.
    pub compress: bool,

    /// Renumber objects before writing.
    pub optimize: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: true,
            optimize: false,
            buffer_size: 8192,
        }
    }
}

impl From<CompressionLevel> for WriteOptions {
    fn from(level: CompressionLevel) -> Self {
        Self {
            compress: level.compresses(),
            optimize: level == CompressionLevel::Maximum,
            ..Default::default()
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone, Serialize)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Whether compression was applied.
    pub compressed: bool,

    /// Whether optimization was applied.
    pub optimized: bool,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer for the given compression level.
    pub fn with_compression(level: CompressionLevel) -> Self {
        Self::with_options(level.into())
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self::with_options(WriteOptions {
            atomic: false,
            ..Default::default()
        })
    }

    /// Save a PDF document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory doesn't exist
    /// - Insufficient permissions
    /// - Disk full
    /// - Serialization fails
    pub async fn save(&self, doc: &Document, path: &Path) -> Result<()> {
        self.save_with_stats(doc, path).await.map(|_| ())
    }

    /// Save a PDF and return statistics about the operation.
    pub async fn save_with_stats(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        let mut stats = self.save_all(&[(doc, path)]).await?;
        stats
            .pop()
            .ok_or_else(|| PdfBookError::other("Write produced no statistics"))
    }

    /// Save several documents so that either every target is replaced or
    /// none is.
    ///
    /// Each document is first written to a sibling temp file. Only when all
    /// of them have been written are they renamed into place. On failure the
    /// temp files are removed, and targets already renamed are removed too.
    ///
    /// With atomic writes disabled the documents are written straight to
    /// their targets, one after the other.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfbook::io::PdfWriter;
    /// # use lopdf::Document;
    /// # use std::path::Path;
    /// # async fn example(a: Document, b: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let writer = PdfWriter::new();
    /// let stats = writer
    ///     .save_all(&[(&a, Path::new("a.pdf")), (&b, Path::new("b.pdf"))])
    ///     .await?;
    /// assert_eq!(stats.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save_all(&self, jobs: &[(&Document, &Path)]) -> Result<Vec<WriteStatistics>> {
        let options = self.options.clone();

        // Clone the documents for processing in blocking task
        let owned: Vec<(Document, PathBuf)> = jobs
            .iter()
            .map(|(doc, path)| ((*doc).clone(), path.to_path_buf()))
            .collect();

        task::spawn_blocking(move || write_all(owned, &options))
            .await
            .map_err(|e| PdfBookError::other(format!("Write task failed: {e}")))?
    }

    /// Serialize a document into memory.
    ///
    /// This is synchronous; call it from a blocking context.
    pub fn to_bytes(&self, doc: &Document) -> Result<Vec<u8>> {
        let mut doc = doc.clone();
        prepare(&mut doc, &self.options);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).map_err(|e| PdfBookError::FailedToWrite {
            path: PathBuf::from(crate::io::reader::IN_MEMORY_SOURCE),
            source: std::io::Error::other(e),
        })?;
        Ok(buffer)
    }

    /// Check if a file can be written to the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory doesn't exist
    /// - Parent directory is not writable
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let metadata = tokio::fs::metadata(parent).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PdfBookError::invalid_config(format!(
                        "Output directory does not exist: {}",
                        parent.display()
                    ))
                } else {
                    PdfBookError::FileNotAccessible {
                        path: parent.to_path_buf(),
                        source: e,
                    }
                }
            })?;

            if !metadata.is_dir() {
                return Err(PdfBookError::invalid_config(format!(
                    "Output directory is not a directory: {}",
                    parent.display()
                )));
            }

            if metadata.permissions().readonly() {
                return Err(PdfBookError::invalid_config(format!(
                    "Output directory is not writable: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

fn prepare(doc: &mut Document, options: &WriteOptions) {
    if options.compress {
        doc.compress();
    }

    if options.optimize {
        doc.renumber_objects();
    }
}

fn write_all(
    jobs: Vec<(Document, PathBuf)>,
    options: &WriteOptions,
) -> Result<Vec<WriteStatistics>> {
    let mut pending: Vec<(PathBuf, PathBuf, Duration)> = Vec::with_capacity(jobs.len());

    for (mut doc, path) in jobs {
        let write_path = if options.atomic {
            temp_path(&path)
        } else {
            path.clone()
        };

        let start = Instant::now();
        let written = write_document(&mut doc, &write_path, options);
        if let Err(e) = written {
            if options.atomic {
                discard(pending.iter().map(|(_, temp, _)| temp.as_path()));
                discard([write_path.as_path()]);
            }
            return Err(e);
        }
        pending.push((path, write_path, start.elapsed()));
    }

    if options.atomic {
        for (index, (path, temp, _)) in pending.iter().enumerate() {
            if let Err(e) = std::fs::rename(temp, path) {
                discard(pending[..index].iter().map(|(done, _, _)| done.as_path()));
                discard(pending[index..].iter().map(|(_, temp, _)| temp.as_path()));
                return Err(PdfBookError::FailedToWrite {
                    path: path.clone(),
                    source: e,
                });
            }
        }
    }

    Ok(pending
        .into_iter()
        .map(|(path, _, write_time)| {
            let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            log::debug!("Wrote {} ({file_size} bytes)", path.display());
            WriteStatistics {
                write_time,
                file_size,
                output_path: path,
                compressed: options.compress,
                optimized: options.optimize,
            }
        })
        .collect())
}

fn write_document(doc: &mut Document, write_path: &Path, options: &WriteOptions) -> Result<()> {
    prepare(doc, options);

    let file =
        std::fs::File::create(write_path).map_err(|e| PdfBookError::FailedToCreateOutput {
            path: write_path.to_path_buf(),
            source: e,
        })?;

    let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);

    doc.save_to(&mut writer)
        .map_err(|e| PdfBookError::FailedToWrite {
            path: write_path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

    writer.flush().map_err(|e| PdfBookError::FailedToWrite {
        path: write_path.to_path_buf(),
        source: e,
    })
}

/// Best-effort removal of partial output.
fn discard<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!("Could not remove {}: {e}", path.display());
        }
    }
}
