use std::{fs, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;
use tracing::info;

use srgmap::{
    error::Error,
    jar::transcode,
    mapping::load_symbol_map,
    types::{RenameEvent, StageProgress},
};

/// Rename searge field/method names in a jar to their MCP spellings.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// MCP data archive containing the mapping CSVs
    #[arg(long)]
    mcp: PathBuf,

    /// Input jar
    #[arg(long)]
    input: PathBuf,

    /// Output jar
    #[arg(long)]
    output: PathBuf,

    /// Drop .SF/.RSA entries and scrub manifest digests
    #[arg(long)]
    strip_signatures: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    info!("Input:  {}", args.input.display());
    info!("Output: {}", args.output.display());
    info!("MCP:    {}", args.mcp.display());

    if !args.mcp.exists() {
        return Err(Error::MissingResource(args.mcp).into());
    }
    if !args.input.exists() {
        return Err(Error::MissingResource(args.input).into());
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    // For an in-place run the transcoder must read the source before the
    // path is truncated, so only a distinct pre-existing output is removed.
    let in_place = args.output.exists()
        && fs::canonicalize(&args.input)? == fs::canonicalize(&args.output)?;
    if args.output.exists() && !in_place {
        fs::remove_file(&args.output)?;
    }

    info!("Loading MCP data");
    let map = load_symbol_map(&args.mcp, |_| {})?;

    let bar = ProgressBar::new(100);
    transcode(
        &args.input,
        &args.output,
        &map,
        args.strip_signatures,
        |event: RenameEvent| match event.progress {
            StageProgress::Percentage(fraction) => bar.set_position((fraction * 100.0) as u64),
            StageProgress::Done => bar.finish(),
            StageProgress::Unknown => {}
        },
    )?;

    info!("Process complete");
    Ok(())
}
