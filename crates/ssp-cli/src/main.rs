//! SSP Reconcile CLI - Command-line interface for the reconciliation engine

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use ssp_core::{parse_document, Reconciler, ReconcilerConfig, SourceLabel};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ssp-reconcile")]
#[command(about = "SSP Reconcile - Catalog reconciliation and sanitization for OSCAL SSPs")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Reconcile a catalog with an existing document
    Compare {
        /// Catalog document
        #[arg(long)]
        catalog: PathBuf,
        /// Prior SSP, simplified export or embedded catalog
        #[arg(long)]
        ssp: PathBuf,
    },
    /// Compare up to three documents control by control
    Matrix {
        #[arg(long)]
        baseline: Option<PathBuf>,
        #[arg(long)]
        csp1: Option<PathBuf>,
        #[arg(long)]
        csp2: Option<PathBuf>,
    },
    /// Reconcile, then emit a sanitized OSCAL SSP
    Export {
        /// Catalog document
        #[arg(long)]
        catalog: PathBuf,
        /// Prior SSP, simplified export or embedded catalog
        #[arg(long)]
        ssp: PathBuf,
        /// Where the catalog was published, recorded as the source profile.
        /// Defaults to the catalog's own canonical link.
        #[arg(long)]
        catalog_url: Option<String>,
    },
    /// Sanitize any JSON document
    Sanitize {
        /// Document to sanitize
        file: PathBuf,
    },
    /// Check configuration validity
    CheckConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ReconcilerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ReconcilerConfig::default(),
    };
    let mut reconciler = Reconciler::new(config).context("invalid configuration")?;

    match cli.command {
        Commands::Compare { catalog, ssp } => {
            let catalog = read_document(&catalog)?;
            let existing = read_document(&ssp)?;
            let result = reconciler.compare_with_catalog(&catalog, &existing);
            write_output(cli.output.as_deref(), &result)?;
        }
        Commands::Matrix {
            baseline,
            csp1,
            csp2,
        } => {
            let mut documents = Vec::new();
            for (label, path) in [
                (SourceLabel::Baseline, baseline),
                (SourceLabel::Csp1, csp1),
                (SourceLabel::Csp2, csp2),
            ] {
                if let Some(path) = path {
                    documents.push((label, read_document(&path)?));
                }
            }
            if documents.is_empty() {
                bail!("matrix needs at least one of --baseline, --csp1, --csp2");
            }

            let sources: Vec<(SourceLabel, &Value)> =
                documents.iter().map(|(label, doc)| (*label, doc)).collect();
            let result = reconciler.compare_documents(&sources);
            write_output(cli.output.as_deref(), &result)?;
        }
        Commands::Export {
            catalog,
            ssp,
            catalog_url,
        } => {
            let catalog_doc = read_document(&catalog)?;
            let existing = read_document(&ssp)?;
            let result = reconciler.compare_with_catalog(&catalog_doc, &existing);
            let document =
                reconciler.export_ssp(&result, Some(&catalog_doc), catalog_url.as_deref());
            write_output(cli.output.as_deref(), &document)?;
        }
        Commands::Sanitize { file } => {
            let document = read_document(&file)?;
            write_output(cli.output.as_deref(), &reconciler.finalize(&document))?;
        }
        Commands::CheckConfig => {
            println!("Configuration OK");
            println!("{}", render_config(reconciler.config())?);
        }
    }

    if let Some((hits, misses)) = reconciler.cache_stats() {
        info!(hits, misses, "Extraction cache");
    }

    Ok(())
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_document(&text).with_context(|| format!("parsing {}", path.display()))
}

fn write_output<T: Serialize>(path: Option<&Path>, value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Output written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn render_config(config: &ReconcilerConfig) -> anyhow::Result<String> {
    serde_json::to_string_pretty(config).context("rendering configuration")
}
