//! Page-level building blocks: selecting pages into new documents,
//! rendering blank pages, stamping document metadata and keeping
//! navigation in step with the selected pages.

pub mod blank;
pub mod extractor;
pub mod metadata;
pub mod navigation;

pub use blank::{BlankPageRenderer, PageSize};
pub use extractor::PageExtractor;
pub use metadata::MetadataManager;
