//! User-facing output for pdfbook.
//!
//! The formatter prints status lines; the `display_*` helpers below turn
//! operation statistics into the summaries the CLI shows after a run.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbook::config::OutputOptions;
//! use pdfbook::output::OutputFormatter;
//!
//! let formatter = OutputFormatter::from_options(&OutputOptions::default());
//! formatter.info("Splitting book.pdf");
//! formatter.success("Split complete");
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::append::AppendStatistics;
use crate::booklet::BookletStatistics;
use crate::impose::ImposeStatistics;
use crate::io::WriteStatistics;
use crate::split::SplitStatistics;
use crate::validation::InputCheck;

/// One-line description of a split, e.g. `6 pages + 2 blank -> 4 + 4 pages`.
pub fn split_summary(stats: &SplitStatistics) -> String {
    format!(
        "{} pages + {} blank -> {} + {} pages",
        stats.source_pages, stats.blank_pages_added, stats.first_pages, stats.second_pages
    )
}

/// Display a validated input file.
pub fn display_input_check(formatter: &OutputFormatter, check: &InputCheck) {
    formatter.detail(
        "Input",
        &format!(
            "{} (PDF {}, {})",
            check.path.display(),
            check.version,
            check.format_file_size()
        ),
    );
}

/// Display split statistics.
pub fn display_split_statistics(formatter: &OutputFormatter, stats: &SplitStatistics) {
    if stats.blank_pages_added > 0 {
        formatter.debug(&format!(
            "Padded to {} pages with {} blank page(s)",
            stats.padded_pages(),
            stats.blank_pages_added
        ));
    }

    formatter.info(&format!(
        "Split in {:.2}s: {}",
        stats.split_time.as_secs_f64(),
        split_summary(stats)
    ));
    formatter.detail("Input size", &stats.format_input_size());
    display_written(formatter, &stats.outputs);
}

/// Display imposition statistics.
pub fn display_impose_statistics(formatter: &OutputFormatter, stats: &ImposeStatistics) {
    formatter.info(&format!(
        "Imposed {} pages per half onto {} sheet(s) in {:.2}s",
        stats.pages_per_half,
        stats.sheets,
        stats.impose_time.as_secs_f64()
    ));
    display_written(formatter, stats.output.as_slice());
}

/// Display blank-page append statistics.
pub fn display_append_statistics(formatter: &OutputFormatter, stats: &AppendStatistics) {
    formatter.info(&format!(
        "Appended a blank page: {} -> {} pages",
        stats.source_pages, stats.result_pages
    ));
    display_written(formatter, stats.output.as_slice());
}

/// Display booklet statistics.
pub fn display_booklet_statistics(formatter: &OutputFormatter, stats: &BookletStatistics) {
    if stats.empty_quadrants > 0 {
        formatter.debug(&format!("{} quadrant(s) left empty", stats.empty_quadrants));
    }

    formatter.info(&format!(
        "Imposed {} pages as a booklet on {} sheet(s) in {:.2}s",
        stats.source_pages,
        stats.sheets,
        stats.booklet_time.as_secs_f64()
    ));
    display_written(formatter, stats.output.as_slice());
}

fn display_written(formatter: &OutputFormatter, outputs: &[WriteStatistics]) {
    for (index, output) in outputs.iter().enumerate() {
        formatter.list_item(
            index + 1,
            &format!(
                "{} ({})",
                output.output_path.display(),
                output.format_file_size()
            ),
        );
        formatter.detail(
            "Write time",
            &format!("{:.2}s", output.write_time.as_secs_f64()),
        );
    }
}
