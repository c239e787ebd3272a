#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless autobattler round.

mod config;
mod simulation;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::{config::MatchConfig, simulation::MatchReport};

/// Headless autobattler round: spawn units, walk them toward random goals.
#[derive(Debug, Parser)]
#[command(name = "autobattler")]
struct Args {
    /// TOML match configuration; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Connected players.
    #[arg(long)]
    players: Option<usize>,

    /// Board layout origins available.
    #[arg(long)]
    origins: Option<usize>,

    /// Combat ticks to simulate.
    #[arg(long)]
    ticks: Option<u32>,

    /// Units spawned on every board.
    #[arg(long)]
    units_per_board: Option<usize>,

    /// Seed for deterministic runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Args {
    fn match_config(&self) -> Result<MatchConfig> {
        let mut config = match &self.config {
            Some(path) => MatchConfig::load(path)?,
            None => MatchConfig::default(),
        };

        if let Some(players) = self.players {
            config.players = players;
        }
        if let Some(origins) = self.origins {
            config.origins = origins;
        }
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if let Some(units) = self.units_per_board {
            config.units_per_board = units;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }
}

/// Entry point for the autobattler command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = args.match_config()?;
    let report = simulation::run_match(&config)?;

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report.boards)
                .context("failed to serialize board snapshots")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn render_text(report: &MatchReport) -> String {
    let mut out = format!(
        "round finished in {:?} after {} ticks on {} boards\n",
        report.flow_state,
        report.ticks,
        report.boards.len()
    );
    for board in &report.boards {
        out.push_str(&format!(
            "board {}: {} units, {} moves, {} rejected, revision {}\n",
            board.index,
            board.spawned,
            board.moves,
            board.rejected_moves,
            board.snapshot.revision()
        ));
        for record in board.snapshot.occupants() {
            out.push_str(&format!("  unit {} at {}\n", record.unit, record.cell));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "autobattler",
            "--players",
            "6",
            "--seed",
            "11",
            "--format",
            "json",
        ]);

        let config = args.match_config().expect("no config file");

        assert_eq!(config.players, 6);
        assert_eq!(config.seed, 11);
        assert_eq!(config.ticks, MatchConfig::default().ticks);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn text_report_lists_every_board() {
        let config = MatchConfig {
            players: 2,
            units_per_board: 1,
            ..MatchConfig::default()
        };
        let report = simulation::run_match(&config).expect("match runs");

        let text = render_text(&report);

        assert!(text.starts_with("round finished in Result after 12 ticks on 2 boards"));
        assert!(text.contains("board 0: 1 units"));
        assert!(text.contains("board 1: 1 units"));
        assert!(text.contains("unit #1 at ("));
        assert!(text.contains(" 0 rejected, revision "));
    }
}
