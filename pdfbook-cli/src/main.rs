//! pdfbook - Prepare PDF documents for booklet printing.
//!
//! Command-line front end for the `pdfbook` library.

mod cli;

use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use crate::cli::{AppendArgs, BookletArgs, Cli, Command, ImposeArgs, ServeArgs, SplitArgs};
use pdfbook::append::append_blank_pdf;
use pdfbook::booklet::booklet_pdf;
use pdfbook::config::{OutputOptions, OverwriteMode};
use pdfbook::error::{PdfBookError, Result};
use pdfbook::impose::impose_pdfs;
use pdfbook::output::{
    OutputFormatter, display_append_statistics, display_booklet_statistics,
    display_impose_statistics, display_input_check, display_split_statistics,
};
use pdfbook::server::HttpServer;
use pdfbook::split::split_pdf;
use pdfbook::validation::Validator;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.command);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Install the logger. `RUST_LOG` wins over the per-command default.
fn init_logging(command: &Command) {
    let default_level = match command {
        Command::Serve(_) => "info",
        _ => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Split(args) => run_split(&args).await,
        Command::Impose(args) => run_impose(&args).await,
        Command::Booklet(args) => run_booklet(&args).await,
        Command::AppendBlank(args) => run_append(&args).await,
        Command::Serve(args) => run_serve(&args).await,
    }
}

async fn run_split(args: &SplitArgs) -> Result<()> {
    let config = args.to_config()?;
    let formatter = OutputFormatter::from_options(&config.output);
    print_header(&formatter);

    let check = Validator::new().validate_input(&config.input).await?;
    display_input_check(&formatter, &check);

    if !config.output.dry_run {
        handle_output_overwrite(&config.outputs(), &config.output, &formatter)?;
    }

    formatter.info(&format!("Splitting {}...", config.input.display()));
    let stats = split_pdf(&config).await?;

    display_split_statistics(&formatter, &stats);
    finish(&formatter, &config.output, &config.outputs(), args.output.json, &stats)
}

async fn run_impose(args: &ImposeArgs) -> Result<()> {
    let config = args.to_config()?;
    let formatter = OutputFormatter::from_options(&config.output);
    print_header(&formatter);

    let validator = Validator::new();
    for check in validator
        .validate_inputs(&[config.first.as_path(), config.second.as_path()])
        .await?
    {
        display_input_check(&formatter, &check);
    }

    let outputs = [config.destination.as_path()];
    if !config.output.dry_run {
        handle_output_overwrite(&outputs, &config.output, &formatter)?;
    }

    formatter.info("Imposing halves...");
    let stats = impose_pdfs(&config).await?;

    display_impose_statistics(&formatter, &stats);
    finish(&formatter, &config.output, &outputs, args.output.json, &stats)
}

async fn run_booklet(args: &BookletArgs) -> Result<()> {
    let config = args.to_config()?;
    let formatter = OutputFormatter::from_options(&config.output);
    print_header(&formatter);

    let check = Validator::new().validate_input(&config.input).await?;
    display_input_check(&formatter, &check);

    let outputs = [config.destination.as_path()];
    if !config.output.dry_run {
        handle_output_overwrite(&outputs, &config.output, &formatter)?;
    }

    formatter.info(&format!("Imposing {} as a booklet...", config.input.display()));
    let stats = booklet_pdf(&config).await?;

    display_booklet_statistics(&formatter, &stats);
    finish(&formatter, &config.output, &outputs, args.output.json, &stats)
}

async fn run_append(args: &AppendArgs) -> Result<()> {
    let config = args.to_config()?;
    let formatter = OutputFormatter::from_options(&config.output);
    print_header(&formatter);

    let check = Validator::new().validate_input(&config.input).await?;
    display_input_check(&formatter, &check);

    let outputs = [config.destination.as_path()];
    if !config.output.dry_run {
        handle_output_overwrite(&outputs, &config.output, &formatter)?;
    }

    let stats = append_blank_pdf(&config).await?;

    display_append_statistics(&formatter, &stats);
    finish(&formatter, &config.output, &outputs, args.output.json, &stats)
}

async fn run_serve(args: &ServeArgs) -> Result<()> {
    let config = args.to_config()?;
    HttpServer::with_config(config).start().await
}

fn print_header(formatter: &OutputFormatter) {
    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfbook::NAME, pdfbook::VERSION));
        formatter.blank_line();
    }
}

/// Report the outcome, as JSON when asked to.
fn finish<T: Serialize>(
    formatter: &OutputFormatter,
    options: &OutputOptions,
    outputs: &[&Path],
    json: bool,
    stats: &T,
) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(stats)
            .map_err(|e| PdfBookError::other(format!("Failed to serialize statistics: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    formatter.blank_line();
    if options.dry_run {
        formatter.success("Dry run completed successfully");
        for output in outputs {
            formatter.info(&format!("  Output would be: {}", output.display()));
        }
        formatter.info("  Run without --dry-run to write the output");
    } else {
        let written: Vec<String> = outputs
            .iter()
            .map(|output| output.display().to_string())
            .collect();
        formatter.success(&format!("Successfully created {}", written.join(", ")));
    }

    Ok(())
}

/// Handle existing output files according to the overwrite mode.
///
/// `Prompt` asks once for all existing outputs; quiet mode treats it as
/// `NoClobber`.
fn handle_output_overwrite(
    outputs: &[&Path],
    options: &OutputOptions,
    formatter: &OutputFormatter,
) -> Result<()> {
    let existing: Vec<&Path> = outputs
        .iter()
        .copied()
        .filter(|output| output.exists())
        .collect();

    let Some(&first_existing) = existing.first() else {
        return Ok(());
    };

    match options.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PdfBookError::output_exists(first_existing.to_path_buf())),
        OverwriteMode::Prompt => {
            if formatter.is_quiet() {
                return Err(PdfBookError::output_exists(first_existing.to_path_buf()));
            }

            for output in &existing {
                formatter.warning(&format!("Output file already exists: {}", output.display()));
            }

            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PdfBookError::other(format!("Failed to read input: {err}")))?;

            if confirmed(&response) {
                Ok(())
            } else {
                Err(PdfBookError::Cancelled)
            }
        }
    }
}

fn confirmed(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}
