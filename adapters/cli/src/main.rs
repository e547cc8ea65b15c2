#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a wall-building scenario.

mod runner;
mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rampart_core::ResourceKind;
use tracing_subscriber::EnvFilter;

use runner::Report;
use scenario::Scenario;

/// Replays a scripted wall-placement scenario and prints the resulting fortifications.
#[derive(Debug, Parser)]
#[command(name = "rampart", version, about)]
struct Cli {
    /// Path to the TOML scenario to replay.
    #[arg(long)]
    scenario: PathBuf,
    /// Log session and world activity at debug level.
    #[arg(long)]
    verbose: bool,
}

/// Entry point for the Rampart command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    install_tracing(cli.verbose);

    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("failed to load scenario {}", cli.scenario.display()))?;
    let report = runner::run(scenario).context("failed to replay scenario")?;
    print_report(&report);
    Ok(())
}

fn install_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn print_report(report: &Report) {
    println!(
        "placed {} pieces in {} runs",
        report.pieces.len(),
        report.runs_placed
    );
    for piece in &report.pieces {
        let position = piece.pose.position;
        let neighbors: Vec<u32> = piece.neighbors.iter().map(|id| id.get()).collect();
        println!(
            "piece {} {:?} at ({:.2}, {:.2}, {:.2}) length {:.2} neighbors {:?} shape {:?}",
            piece.id.get(),
            piece.kind,
            position.x,
            position.y,
            position.z,
            piece.record.length(),
            neighbors,
            piece.shape.kind,
        );
    }
    for failure in &report.failures {
        println!("failure: {failure}");
    }
    println!(
        "stockpile: gold {} wood {} stone {}",
        report.stockpile(ResourceKind::Gold),
        report.stockpile(ResourceKind::Wood),
        report.stockpile(ResourceKind::Stone),
    );
    println!("structures: {}", report.structures);
    println!("session: {:?}", report.session_state);
}
