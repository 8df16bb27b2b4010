//! Command-line interface for memedex.
//!
//! Provides commands for generating the lookup indexes, building asset
//! pack manifests, querying the generated indexes, and inspecting the
//! resolved configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::aggregate::Aggregator;
use crate::config;
use crate::index::{IndexPaths, MemeIndex};
use crate::packs;

/// memedex - meme metadata index generator
#[derive(Parser, Debug)]
#[command(name = "memedex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate info.json records into infos.json and keyMap.json
    Generate {
        /// Source directory to scan (repeatable; overrides configuration)
        #[arg(short, long)]
        src: Vec<PathBuf>,

        /// Output directory (defaults to the configured directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Build an asset pack manifest from raw meme repositories
    Packs {
        /// Source repository directory (repeatable)
        #[arg(short, long, required = true)]
        src: Vec<PathBuf>,

        /// Output directory for assets and JSON files
        #[arg(short, long)]
        out_dir: PathBuf,
    },

    /// Look up an entry in the generated indexes by key or keyword
    Lookup {
        /// Key or keyword to resolve
        query: String,

        /// Print the full record as pretty JSON
        #[arg(short, long)]
        full: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate { src, out_dir } => generate_indexes(src, out_dir).await,
            Commands::Packs { src, out_dir } => build_manifest(src, out_dir).await,
            Commands::Lookup { query, full } => lookup_entry(&query, full).await,
            Commands::Config => show_config().await,
        }
    }
}

/// Run the aggregation pass and persist both indexes
async fn generate_indexes(src: Vec<PathBuf>, out_dir: Option<PathBuf>) -> Result<()> {
    let cfg = config::config()?;

    let sources = if src.is_empty() {
        cfg.sources.clone()
    } else {
        src
    };
    let paths = match out_dir {
        Some(dir) => IndexPaths::in_dir(dir),
        None => cfg.index_paths(),
    };

    let outcome = Aggregator::new(sources).scan().await?;
    outcome.index.save(&paths).await?;

    println!(
        "Successfully generated {} and {}",
        paths.infos.display(),
        paths.key_map.display()
    );
    println!("{} memes found.", outcome.index.len());

    Ok(())
}

/// Build and persist the asset pack manifest
async fn build_manifest(src: Vec<PathBuf>, out_dir: PathBuf) -> Result<()> {
    let output = packs::build_packs(&src, &out_dir).await?;
    output.save(&out_dir).await?;

    println!(
        "Wrote {} and {}",
        out_dir.join("infos.json").display(),
        out_dir.join("keyMap.json").display()
    );
    println!("Assets copied under: {}", out_dir.join("assets").display());
    println!(
        "{} packs, {} items.",
        output.manifest.total_packs, output.manifest.total_items
    );

    Ok(())
}

/// Resolve a key or keyword against the generated indexes
async fn lookup_entry(query: &str, full: bool) -> Result<()> {
    let cfg = config::config()?;
    let index = MemeIndex::load(&cfg.index_paths())
        .await
        .context("Failed to load indexes; run `memedex generate` first")?;

    let Some(info) = index.resolve(query) else {
        anyhow::bail!("No entry found for: {}", query);
    };

    println!("Key: {}", info.key());
    let keywords: Vec<&str> = info.keywords().collect();
    if !keywords.is_empty() {
        println!("Keywords: {}", keywords.join(", "));
    }

    if full {
        println!("{}", serde_json::to_string_pretty(info)?);
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
async fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Sources (in scan order):");
    for source in &cfg.sources {
        println!("  {}", source.display());
    }
    println!();
    let paths = cfg.index_paths();
    println!("Output:");
    println!("  Info index:  {}", paths.infos.display());
    println!("  Keyword map: {}", paths.key_map.display());

    Ok(())
}
