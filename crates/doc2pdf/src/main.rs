//! doc2pdf: convert Word, Excel, PowerPoint, image, text, HTML or PDF files
//! into a single PDF.
//!
//! `doc2pdf report.docx -o out/ --quality high`

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;

use convert_core::geometry::PageSize;
use convert_core::options::{ConversionOptions, Quality};
use convert_core::source::AdmissionPolicy;
use doc2pdf::{load_source_within, save_artifact, Converter};

#[derive(Parser)]
#[command(name = "doc2pdf", version, about = "Convert documents to PDF")]
struct Cli {
    /// Input file
    input: Option<PathBuf>,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page size: a3, a4, a5, letter, legal
    #[arg(long)]
    page_size: Option<String>,

    /// Rendering quality: draft, standard, high
    #[arg(long)]
    quality: Option<String>,

    /// Page margin in points
    #[arg(long)]
    margin: Option<f32>,

    /// Content height in pixels above which documents are rendered page by page
    #[arg(long)]
    threshold: Option<u32>,

    /// Give up on rendering after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dump effective merged config as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

/// Load config from global and project-local TOML files.
/// The project-local file replaces the global one. Missing files are ignored.
fn load_config() -> ConversionOptions {
    let mut opts = ConversionOptions::default();

    let mut candidates = Vec::new();
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("doc2pdf").join("config.toml"));
    }
    candidates.push(PathBuf::from(".doc2pdf.toml"));

    for path in candidates {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            match ConversionOptions::from_toml(&contents) {
                Ok(parsed) => {
                    log::debug!("Loaded config from {}", path.display());
                    opts = parsed;
                }
                Err(e) => log::warn!("Failed to parse {}: {}", path.display(), e),
            }
        }
    }

    opts
}

/// Apply CLI flags on top of config-loaded options.
fn apply_cli_overrides(opts: &mut ConversionOptions, cli: &Cli) -> Result<()> {
    if cli.verbose > 0 {
        opts.verbose = cli.verbose;
    }

    if let Some(ref name) = cli.page_size {
        opts.page_size =
            PageSize::from_name(name).with_context(|| format!("Unknown page size: {}", name))?;
    }

    if let Some(ref name) = cli.quality {
        opts.quality =
            Quality::from_name(name).with_context(|| format!("Unknown quality: {}", name))?;
    }

    if let Some(margin) = cli.margin {
        if margin < 0.0 {
            bail!("Margin must not be negative");
        }
        opts.margin = margin;
    }

    if let Some(threshold) = cli.threshold {
        opts.large_document_threshold = threshold;
    }

    if let Some(secs) = cli.timeout {
        opts.render_timeout_secs = Some(secs);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose > 0 { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut opts = load_config();
    if let Err(e) = apply_cli_overrides(&mut opts, &cli) {
        eprintln!("Error: {:#}", e);
        process::exit(2);
    }

    if cli.dump_config {
        match opts.to_toml() {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    let Some(input) = cli.input.clone() else {
        eprintln!("Usage: doc2pdf <input> [-o <output-dir>] [options]");
        process::exit(1);
    };
    let output = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));

    if let Err(e) = run_conversion(input, output, opts).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run_conversion(input: PathBuf, output: PathBuf, options: ConversionOptions) -> Result<()> {
    let source = load_source_within(&input, options.max_file_size)
        .with_context(|| format!("Cannot read {}", input.display()))?;

    AdmissionPolicy::default()
        .with_max_bytes(options.max_file_size)
        .admit(&source)
        .with_context(|| format!("{} was not accepted", source.name()))?;

    let name = source.name().to_string();
    let converter = Converter::new(options);
    let artifact = converter
        .convert(source)
        .await
        .with_context(|| format!("Conversion of {} failed", name))?;

    std::fs::create_dir_all(&output)
        .with_context(|| format!("Cannot create {}", output.display()))?;
    let path = save_artifact(&artifact, &name, &output)
        .with_context(|| format!("Cannot save into {}", output.display()))?;

    match artifact.page_count() {
        Some(pages) => println!("{} ({} page(s))", path.display(), pages),
        None => println!("{}", path.display()),
    }
    Ok(())
}
