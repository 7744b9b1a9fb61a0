//! pdfbook - Prepare PDF documents for booklet printing.
//!
//! The core operation pads a document with labelled blank pages to a
//! multiple of eight and splits it into two halves by a fixed interleaving
//! rule. Around it the library offers:
//!
//! - Four-up imposition of the two halves onto A4 sheets
//! - Single-file four-up booklets in folding order
//! - Appending a single blank page, from a file or over HTTP
//! - Atomic writes of one or several outputs
//! - Metadata stamping
//!
//! # Examples
//!
//! ## Split a document
//!
//! ```no_run
//! use pdfbook::config::SplitConfig;
//! use pdfbook::split;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SplitConfig::with_default_outputs("book.pdf");
//! let stats = split::split_pdf(&config).await?;
//! println!("Wrote {} + {} pages", stats.first_pages, stats.second_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## The layout on its own
//!
//! ```
//! use pdfbook::split::partition;
//!
//! let (first, second) = partition(&[1, 2, 3, 4, 5, 6, 7, 8]);
//! assert_eq!(first, [8, 1, 2, 7]);
//! assert_eq!(second, [3, 6, 4, 5]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod append;
pub mod booklet;
pub mod config;
pub mod error;
pub mod impose;
pub mod io;
pub mod output;
pub mod pages;
pub mod server;
pub mod split;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use config::{AppendConfig, BookletConfig, ImposeConfig, ServerConfig, SplitConfig};
pub use error::{PdfBookError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
