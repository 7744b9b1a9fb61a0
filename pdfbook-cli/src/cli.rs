//! CLI argument parsing for pdfbook.
//!
//! This module defines the command-line interface structure using `clap`.
//! Each subcommand converts into one of the library's operation configs.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use pdfbook::config::{
    AppendConfig, BookletConfig, CompressionLevel, ImposeConfig, OutputOptions, OverwriteMode,
    ServerConfig, SplitConfig, default_booklet_output, default_split_outputs,
};
use pdfbook::error::{PdfBookError, Result};

/// Prepare PDF documents for booklet printing.
///
/// pdfbook pads a document with labelled blank pages to a multiple of
/// eight and splits it into two halves that print and fold into booklets.
/// It can also impose the halves four pages to a sheet, impose a whole
/// document as a folding booklet, append a blank page to a document, or
/// serve the append operation over HTTP.
#[derive(Parser, Debug)]
#[command(name = "pdfbook")]
#[command(version)]
#[command(about = "Prepare PDF documents for booklet printing", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a PDF into two booklet halves
    ///
    /// The document is padded with labelled blank pages to a multiple of
    /// eight, then divided into two files of equal length.
    ///
    /// Example:
    ///   pdfbook split javascript.pdf
    Split(SplitArgs),

    /// Place two halves four pages to an A4 sheet
    ///
    /// Both inputs must have the same number of pages.
    ///
    /// Example:
    ///   pdfbook impose book_part1.pdf book_part2.pdf -o sheets.pdf
    Impose(ImposeArgs),

    /// Impose a whole PDF four pages to a sheet in booklet order
    ///
    /// Printed double-sided, cut and stacked, the sheets fold into a
    /// booklet. Pages that do not fill the last sheet leave quadrants empty.
    ///
    /// Example:
    ///   pdfbook booklet javascript.pdf
    Booklet(BookletArgs),

    /// Append one blank page to a PDF
    AppendBlank(AppendArgs),

    /// Serve the blank-page append over HTTP
    Serve(ServeArgs),
}

/// Flags shared by every command that writes PDFs.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Dry run - load and process without creating output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show per-file details and timings
    #[arg(short, long)]
    pub verbose: bool,

    /// Force overwrite of existing output files without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output files
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Compression level for output PDFs
    ///
    /// - none: No compression (preserves exact structure)
    /// - standard: Compress content streams (default)
    /// - maximum: Also prune and renumber objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Print statistics as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `pdfbook split`.
#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output path of the first half [default: <stem>_part1.pdf]
    #[arg(long, value_name = "FILE")]
    pub first: Option<PathBuf>,

    /// Output path of the second half [default: <stem>_part2.pdf]
    #[arg(long, value_name = "FILE")]
    pub second: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments of `pdfbook impose`.
#[derive(Args, Debug, Clone)]
pub struct ImposeArgs {
    /// First half (top row of each sheet)
    #[arg(value_name = "FIRST")]
    pub first: PathBuf,

    /// Second half (bottom row of each sheet)
    #[arg(value_name = "SECOND")]
    pub second: PathBuf,

    /// Output PDF file path
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments of `pdfbook booklet`.
#[derive(Args, Debug, Clone)]
pub struct BookletArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output PDF file path [default: <stem>_booklet.pdf]
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments of `pdfbook append-blank`.
#[derive(Args, Debug, Clone)]
pub struct AppendArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output PDF file path
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments of `pdfbook serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long, env = "PDFBOOK_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to
    #[arg(short, long, env = "PDFBOOK_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Largest accepted upload in MiB
    #[arg(long, value_name = "MIB", default_value_t = 32)]
    pub max_upload_mb: usize,
}

impl OutputArgs {
    /// Convert the shared flags into output options.
    ///
    /// `--json` implies quiet so the JSON document is the only thing on
    /// stdout.
    pub fn to_options(&self) -> Result<OutputOptions> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        Ok(OutputOptions {
            dry_run: self.dry_run,
            verbose: self.verbose && !self.json,
            quiet: self.quiet || self.json,
            overwrite_mode,
            compression,
        })
    }
}

impl SplitArgs {
    /// Convert into a validated split configuration.
    pub fn to_config(&self) -> Result<SplitConfig> {
        let (default_first, default_second) = default_split_outputs(&self.input);
        let config = SplitConfig {
            input: self.input.clone(),
            first_output: self.first.clone().unwrap_or(default_first),
            second_output: self.second.clone().unwrap_or(default_second),
            output: self.output.to_options()?,
        };

        config.validate().map_err(|e| {
            PdfBookError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;
        Ok(config)
    }
}

impl ImposeArgs {
    /// Convert into a validated imposition configuration.
    pub fn to_config(&self) -> Result<ImposeConfig> {
        let config = ImposeConfig {
            first: self.first.clone(),
            second: self.second.clone(),
            destination: self.output_file.clone(),
            output: self.output.to_options()?,
        };

        config.validate().map_err(|e| {
            PdfBookError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;
        Ok(config)
    }
}

impl BookletArgs {
    /// Convert into a validated booklet configuration.
    pub fn to_config(&self) -> Result<BookletConfig> {
        let config = BookletConfig {
            input: self.input.clone(),
            destination: self
                .output_file
                .clone()
                .unwrap_or_else(|| default_booklet_output(&self.input)),
            output: self.output.to_options()?,
        };

        config.validate().map_err(|e| {
            PdfBookError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;
        Ok(config)
    }
}

impl AppendArgs {
    /// Convert into a validated append configuration.
    pub fn to_config(&self) -> Result<AppendConfig> {
        let config = AppendConfig {
            input: self.input.clone(),
            destination: self.output_file.clone(),
            output: self.output.to_options()?,
        };

        config.validate().map_err(|e| {
            PdfBookError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;
        Ok(config)
    }
}

impl ServeArgs {
    /// Convert into a validated server configuration.
    pub fn to_config(&self) -> Result<ServerConfig> {
        let max_upload_bytes = self
            .max_upload_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| PdfBookError::invalid_config("Upload limit is too large"))?;

        let config = ServerConfig {
            host: self.host.clone(),
            port: self.port,
            max_upload_bytes,
        };

        config.validate().map_err(|e| {
            PdfBookError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;
        Ok(config)
    }
}
