//! convert-to-cnc-part - CLI tool to turn CNC part drawings into solids.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cnc_solidify::kernel::PrismSolid;
use cnc_solidify::{
    convert_to_cnc_parts, ConsolePrompt, DeclinePrompt, Interaction, MemoryDrawing,
    PipelineConfig, PrismKernel, SolidId,
};

/// Convert CNC part borders in a drawing into 3D solids.
#[derive(Parser, Debug)]
#[command(name = "convert-to-cnc-part")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input drawing JSON file
    input: PathBuf,

    /// Output drawing JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pipeline configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Never prompt; borders without a thickness tag get thickness 0
    #[arg(long)]
    no_prompt: bool,

    /// Print the batch report as JSON
    #[arg(long)]
    report: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Drawing after conversion, with the geometry of every committed solid.
#[derive(Serialize)]
struct Output<'a> {
    drawing: &'a MemoryDrawing,
    solids: Vec<OutputSolid<'a>>,
}

#[derive(Serialize)]
struct OutputSolid<'a> {
    id: SolidId,
    #[serde(flatten)]
    solid: &'a PrismSolid,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    info!("Processing: {}", args.input.display());

    let mut drawing = MemoryDrawing::from_json_file(&args.input)
        .with_context(|| format!("Failed to read drawing {}", args.input.display()))?;
    info!("Loaded {} element(s)", drawing.elements.len());

    let mut prompt: Box<dyn Interaction> = if args.no_prompt {
        Box::new(DeclinePrompt)
    } else {
        Box::new(ConsolePrompt::new(io::stdin().lock(), io::stderr()))
    };

    let mut kernel = PrismKernel::new();
    let report = convert_to_cnc_parts(&mut drawing, &mut kernel, prompt.as_mut(), &config)
        .context("Failed to commit converted parts")?;

    // Write output
    let solids = drawing
        .solids
        .iter()
        .filter_map(|c| match kernel.solid(c.solid) {
            Some(solid) => Some(OutputSolid { id: c.solid, solid }),
            None => {
                warn!("Committed {} is missing from the kernel", c.solid);
                None
            }
        })
        .collect();
    let output = Output {
        drawing: &drawing,
        solids,
    };
    let json = serde_json::to_string_pretty(&output)?;

    let output_path = args.output.unwrap_or_else(|| {
        let mut path = args.input.clone();
        path.set_extension("solid.json");
        path
    });

    std::fs::write(&output_path, &json)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    info!("Generated: {}", output_path.display());

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if !report.passed() {
        anyhow::bail!("{} part(s) failed to convert", report.failed());
    }

    Ok(())
}
