// src/cli/handlers.rs
//! Command handlers: wire config, run stages, print reports.

use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::PipelineConfig;
use crate::pipeline::Pipeline;
use crate::types::{PipelineReport, StageReport};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Dispatches the parsed command line.
///
/// # Errors
///
/// Propagates stage failures and config errors; the binary maps them to a
/// non-zero exit code.
pub fn dispatch(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Run {
            input,
            work_dir,
            rounds,
            damping,
        } => {
            let mut config = config;
            if let Some(r) = rounds {
                config.rounds = *r;
            }
            if let Some(d) = damping {
                config.damping = Some(*d);
            }
            config.validate()?;
            handle_run(&config, input, work_dir, cli.format)
        }
        Commands::Extract { input, output } => {
            let report = Pipeline::new(config)
                .run_extraction(input, output)
                .context("extraction stage failed")?;
            print_stage(&report, cli.format)
        }
        Commands::Propagate { input, output } => {
            let report = Pipeline::new(config)
                .run_propagation_round(input, output)
                .context("propagation round failed")?;
            print_stage(&report, cli.format)
        }
        Commands::Finalize { input, output } => {
            let report = Pipeline::new(config)
                .run_finalize(input, output)
                .context("finalize stage failed")?;
            print_stage(&report, cli.format)
        }
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => PipelineConfig::load().context("failed to load wikirank.toml")?,
    };
    config.verbose = config.verbose || cli.verbose;
    Ok(config)
}

fn handle_run(
    config: &PipelineConfig,
    input: &Path,
    work_dir: &Path,
    format: OutputFormat,
) -> Result<()> {
    let pipeline = Pipeline::new(config.clone());
    let report = pipeline.run(input, work_dir).context("pipeline failed")?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Terminal => print_pipeline(&report),
    }
    Ok(())
}

fn print_stage(report: &StageReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Terminal => {
            println!(
                "  {} {:?} -> {} ({} in, {} out, {})",
                "Stage:".white(),
                report.stage,
                report.output.display(),
                report.records_in,
                report.records_out,
                format_duration(report.duration_ms)
            );
        }
    }
    Ok(())
}

fn print_json(report: &PipelineReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_pipeline(report: &PipelineReport) {
    println!();
    println!("{}", "─".repeat(60).dimmed());
    println!("{}", " PIPELINE REPORT".bold());
    println!("{}", "─".repeat(60).dimmed());
    println!();

    println!("  {} {}", "Graph Nodes:".white(), report.nodes);
    println!("  {} {}", "Rounds Run:".white(), report.rounds_run);
    println!(
        "  {} {}",
        "Duration:".white(),
        format_duration(report.duration_ms)
    );
    println!();

    for stage in &report.stages {
        println!(
            "  {} {:?} {} {} records {}",
            "•".dimmed(),
            stage.stage,
            "→".dimmed(),
            stage.records_out,
            stage.output.display().to_string().dimmed()
        );
    }

    if let Some(last) = report.last_stage() {
        println!();
        println!(
            "  {} {}",
            "Result:".white(),
            last.output.display().to_string().green()
        );
    }

    println!();
    println!("{}", "─".repeat(60).dimmed());
}

fn format_duration(ms: u128) -> String {
    if ms >= 1000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{ms}ms")
    }
}
