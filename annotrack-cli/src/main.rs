use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "annotrack")]
#[command(about = "annotrack - tiled gene annotation track renderer")]
#[command(version)]
#[command(long_about = "
annotrack renders gene annotations from multi-resolution tilesets as a
horizontal track with strand-aware glyphs and collision-free labels.

Examples:
  annotrack tile --bed genes.bed --chrom-sizes hg38.chrom.sizes --out genes.json.gz
  annotrack render --tileset genes.json.gz --region 1M-3M --out genes.svg
  annotrack render --tileset genes.json.gz --region chr17:43M-43.2M --chrom-sizes hg38.chrom.sizes --out brca1.svg
  annotrack inspect --tileset genes.json.gz
  annotrack config --example > annotrack.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a region of a tileset to SVG
    Render {
        /// Tileset file (.json or .json.gz)
        #[arg(long, required = true)]
        tileset: PathBuf,

        /// Output SVG file
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Region to render ('start-end' or 'chr:start-end', e.g. 'chr1:1M-2M')
        #[arg(long)]
        region: Option<String>,

        /// Chromosome sizes file, needed for chromosome regions
        #[arg(long)]
        chrom_sizes: Option<PathBuf>,

        /// Width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Omit the generated-at footer
        #[arg(long)]
        no_footer: bool,

        /// Print frame statistics as JSON
        #[arg(long)]
        stats: bool,
    },

    /// Summarize a tileset: extent, tiles per zoom, decode report
    Inspect {
        /// Tileset file (.json or .json.gz)
        #[arg(long, required = true)]
        tileset: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Build a tileset from BED annotations
    Tile {
        /// BED6/BED12 annotation file (score column is the importance)
        #[arg(long, required = true)]
        bed: PathBuf,

        /// Chromosome sizes file (name and length per line)
        #[arg(long, required = true)]
        chrom_sizes: PathBuf,

        /// Output tileset (.json or .json.gz)
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Finest zoom level
        #[arg(long)]
        max_zoom: Option<u8>,

        /// Features kept per tile
        #[arg(long)]
        max_per_tile: Option<usize>,
    },

    /// Print or write the configuration
    Config {
        /// Print an example configuration with every default
        #[arg(long)]
        example: bool,

        /// Write the effective configuration to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            tileset,
            out,
            region,
            chrom_sizes,
            width,
            height,
            title,
            no_footer,
            stats,
        } => {
            commands::render::execute(
                &config,
                commands::render::RenderArgs {
                    tileset,
                    out,
                    region,
                    chrom_sizes,
                    width,
                    height,
                    title,
                    no_footer,
                    stats,
                },
            )?;
        }

        Commands::Inspect { tileset, json } => {
            commands::inspect::execute(tileset, json)?;
        }

        Commands::Tile {
            bed,
            chrom_sizes,
            out,
            max_zoom,
            max_per_tile,
        } => {
            commands::tile::execute(&config, bed, chrom_sizes, out, max_zoom, max_per_tile)?;
        }

        Commands::Config { example, output } => {
            commands::config::execute(&config, example, output)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet)?;

    if let Err(err) = run(cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            print_error_and_exit(cli_err);
        }
        return Err(err);
    }
    Ok(())
}
