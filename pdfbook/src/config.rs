//! Configuration module for pdfbook.
//!
//! CLI arguments (or library callers) build one of the operation configs
//! below. Each config is validated before any file is touched:
//! - Validation of argument combinations
//! - Resolution of output paths
//! - Application of defaults

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::PdfBookError;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

/// Compression level for output PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Balanced compression.
    #[default]
    Standard,
    /// Compression plus object renumbering for the smallest output.
    Maximum,
}

impl CompressionLevel {
    /// Whether content streams should be compressed before writing.
    pub fn compresses(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl FromStr for CompressionLevel {
    type Err = crate::PdfBookError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfBookError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Settings shared by every operation that writes PDFs.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Dry run mode - validate and report without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,
}

impl OutputOptions {
    /// Validate the option combination.
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }
        Ok(())
    }

    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}

/// Configuration for splitting a PDF into two booklet halves.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// PDF to split.
    pub input: PathBuf,

    /// Output path for the first half.
    pub first_output: PathBuf,

    /// Output path for the second half.
    pub second_output: PathBuf,

    /// Shared output settings.
    pub output: OutputOptions,
}

impl SplitConfig {
    /// Build a config that writes `<stem>_part1.pdf` and `<stem>_part2.pdf`
    /// next to `input`.
    pub fn with_default_outputs(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let (first_output, second_output) = default_split_outputs(&input);
        Self {
            input,
            first_output,
            second_output,
            output: OutputOptions::default(),
        }
    }

    /// All paths this operation writes to.
    pub fn outputs(&self) -> [&Path; 2] {
        [&self.first_output, &self.second_output]
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - Either output equals the input
    /// - Both outputs point to the same file
    pub fn validate(&self) -> Result<()> {
        self.output.validate()?;

        for output in self.outputs() {
            if output == self.input {
                bail!(
                    "Output file cannot be the same as the input file: {}",
                    output.display()
                );
            }
        }

        if self.first_output == self.second_output {
            bail!(
                "Both halves would be written to the same file: {}",
                self.first_output.display()
            );
        }

        Ok(())
    }
}

/// Configuration for placing two halves four-up on A4 sheets.
#[derive(Debug, Clone)]
pub struct ImposeConfig {
    /// First half (top row of every sheet).
    pub first: PathBuf,

    /// Second half (bottom row of every sheet).
    pub second: PathBuf,

    /// Output path for the imposed document.
    pub destination: PathBuf,

    /// Shared output settings.
    pub output: OutputOptions,
}

impl ImposeConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.output.validate()?;

        for input in [&self.first, &self.second] {
            if input == &self.destination {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.destination.display()
                );
            }
        }

        Ok(())
    }
}

/// Configuration for imposing a single PDF as a four-up booklet.
#[derive(Debug, Clone)]
pub struct BookletConfig {
    /// PDF to impose.
    pub input: PathBuf,

    /// Output path for the booklet sheets.
    pub destination: PathBuf,

    /// Shared output settings.
    pub output: OutputOptions,
}

impl BookletConfig {
    /// Build a config that writes `<stem>_booklet.pdf` next to `input`.
    pub fn with_default_output(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let destination = default_booklet_output(&input);
        Self {
            input,
            destination,
            output: OutputOptions::default(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.output.validate()?;

        if self.input == self.destination {
            bail!(
                "Output file cannot be the same as the input file: {}",
                self.destination.display()
            );
        }

        Ok(())
    }
}

/// Configuration for appending a single blank page.
#[derive(Debug, Clone)]
pub struct AppendConfig {
    /// Source PDF.
    pub input: PathBuf,

    /// Output path.
    pub destination: PathBuf,

    /// Shared output settings.
    pub output: OutputOptions,
}

impl AppendConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.output.validate()?;

        if self.input == self.destination {
            bail!(
                "Output file cannot be the same as the input file: {}",
                self.destination.display()
            );
        }

        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to (default: "127.0.0.1").
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 5000).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body in bytes (default: 32 MiB).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("Host cannot be empty");
        }
        if self.max_upload_bytes == 0 {
            bail!("Upload limit must be at least 1 byte");
        }
        Ok(())
    }
}

/// Output paths used when the caller names none: `<stem>_part1.pdf` and
/// `<stem>_part2.pdf` in the input's directory.
pub fn default_split_outputs(input: &Path) -> (PathBuf, PathBuf) {
    (
        sibling_with_suffix(input, "part1"),
        sibling_with_suffix(input, "part2"),
    )
}

/// Booklet output used when the caller names none: `<stem>_booklet.pdf` in
/// the input's directory.
pub fn default_booklet_output(input: &Path) -> PathBuf {
    sibling_with_suffix(input, "booklet")
}

fn sibling_with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{stem}_{suffix}.pdf"))
}
