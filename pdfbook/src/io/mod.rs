//! I/O operations for pdfbook.
//!
//! This module handles all file I/O operations including:
//! - Loading PDF documents from disk or memory
//! - Writing one or several PDFs to disk atomically
//!
//! # Examples
//!
//! ```no_run
//! use pdfbook::io::{PdfReader, PdfWriter};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let doc = reader.load(&PathBuf::from("input.pdf")).await?;
//!
//! let writer = PdfWriter::new();
//! writer.save(&doc.document, &PathBuf::from("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
