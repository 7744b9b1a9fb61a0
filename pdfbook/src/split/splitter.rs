//! PDF rendition of the booklet split.

use lopdf::Document;
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::io::WriteStatistics;
use crate::pages::{BlankPageRenderer, PageExtractor};
use crate::split::layout;
use crate::utils::format_file_size;

/// Statistics about a split operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitStatistics {
    /// Pages in the source document.
    pub source_pages: usize,

    /// Blank pages synthesized to reach a multiple of eight.
    pub blank_pages_added: usize,

    /// Pages in the first half.
    pub first_pages: usize,

    /// Pages in the second half.
    pub second_pages: usize,

    /// Time taken to pad and partition.
    pub split_time: Duration,

    /// Size of the source file in bytes (0 for in-memory sources).
    pub input_size: u64,

    /// Written files, first half first. Empty on a dry run.
    pub outputs: Vec<WriteStatistics>,
}

impl SplitStatistics {
    /// Page count after padding.
    pub fn padded_pages(&self) -> usize {
        self.first_pages + self.second_pages
    }

    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of splitting a document in memory.
#[derive(Debug, Clone)]
pub struct SplitOutput {
    /// First half.
    pub first: Document,

    /// Second half.
    pub second: Document,

    /// Statistics about the split.
    pub statistics: SplitStatistics,
}

/// Pads a document and divides it into two booklet halves.
#[derive(Debug, Clone, Default)]
pub struct Splitter {
    /// Page extractor for page tree operations.
    page_extractor: PageExtractor,
}

impl Splitter {
    /// Create a new splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `doc` into two new documents.
    ///
    /// `doc` is not modified. Padding pages are rendered into a private copy
    /// and end up in whichever half the layout assigns them to. A document
    /// without pages yields two documents without pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the page tree cannot be read or a blank page
    /// cannot be rendered.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfbook::split::Splitter;
    /// # use lopdf::Document;
    /// # fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let output = Splitter::new().split_document(&doc)?;
    /// assert_eq!(
    ///     output.statistics.first_pages,
    ///     output.statistics.second_pages
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn split_document(&self, doc: &Document) -> Result<SplitOutput> {
        let start = Instant::now();

        let mut working = doc.clone();
        let root = self.page_extractor.pages_root(&working)?;
        let pages = self.page_extractor.page_ids(&working);

        let mut renderer = BlankPageRenderer::new();
        let partition = layout::split(&pages, |number| {
            renderer.render(&mut working, root, number)
        })?;

        if partition.padding > 0 {
            log::info!(
                "Padded {} pages with {} blank pages",
                pages.len(),
                partition.padding
            );
        }

        let first = self.page_extractor.select(&working, &partition.first)?;
        let second = self.page_extractor.select(&working, &partition.second)?;

        let statistics = SplitStatistics {
            source_pages: pages.len(),
            blank_pages_added: partition.padding,
            first_pages: partition.first.len(),
            second_pages: partition.second.len(),
            split_time: start.elapsed(),
            ..Default::default()
        };

        Ok(SplitOutput {
            first,
            second,
            statistics,
        })
    }
}
