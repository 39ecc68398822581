// src/cli/args.rs
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

#[derive(Parser)]
#[command(name = "wikirank", version, about = "PageRank over encyclopedia dumps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ./wikirank.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: extract, propagate, finalize
    Run {
        /// Raw dump file or directory of dump files
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Directory for generation files and the final ranking
        #[arg(value_name = "WORK_DIR")]
        work_dir: PathBuf,
        /// Override the configured round count
        #[arg(long)]
        rounds: Option<usize>,
        /// Override the configured damping factor
        #[arg(long)]
        damping: Option<f64>,
    },
    /// Extract the round-zero link graph from a raw dump
    Extract {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// Run a single propagation round between two generation files
    Propagate {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// Sort the final generation into the ranking
    Finalize {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
}
