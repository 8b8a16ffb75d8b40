//! PIO Assembler CLI Tool
//!
//! Command-line interface to the PIO assembler library. Takes a program
//! source file and writes the assembled 16-bit words in the chosen format.
mod file_utils;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use pio_asm::{OutputFormat, assemble};

use crate::file_utils::{read_source, write_program};

/// PIO Assembler CLI
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Input program path (`-` reads stdin)
    #[clap(index = 1)]
    input: PathBuf,

    /// Output file path (defaults to input name with the format's extension,
    /// `-` writes stdout)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[clap(short, long, value_enum, default_value = "binary")]
    format: OutputFormat,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .init();
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let input_path = &args.input;
    let source = read_source(input_path)
        .with_context(|| format!("Failed to read input file: {}", input_path.display()))?;

    log::info!("Assembling file: {}", input_path.display());

    let assembled = assemble(&source).context("Assembly failed")?;

    log::info!(
        "Assembled program {}: {} words ({} bytes)",
        assembled.name.as_deref().unwrap_or("<unnamed>"),
        assembled.len(),
        assembled.size_in_bytes()
    );

    let output_path = args.output.unwrap_or_else(|| {
        if input_path.as_os_str() == "-" {
            PathBuf::from("-")
        } else {
            input_path.with_extension(args.format.extension())
        }
    });

    write_program(&assembled.code, &output_path, args.format)
        .with_context(|| format!("Failed to write output to: {}", output_path.display()))?;

    log::info!("Output written to: {}", output_path.display());

    Ok(())
}
