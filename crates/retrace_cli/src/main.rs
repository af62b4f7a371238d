//! RETRACE CLI
//!
//! Inspect a cycle trace and print replay snapshots from the command line.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use retrace_core::{BoundaryPolicy, DirectivePolicy};
use retrace_log::{StoreConfig, TraceStore};
use retrace_replay::{ReplayConfig, ReplayCursor, Snapshot};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "retrace")]
#[command(about = "RETRACE - replay a pre-computed scheduling trace cycle by cycle", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cycle count and instruction roster of a trace
    Inspect {
        /// Path to trace file
        #[arg(short, long)]
        trace: PathBuf,
    },
    /// Print one snapshot per step, starting from cycle 0
    Replay {
        /// Path to program listing
        #[arg(short, long)]
        listing: PathBuf,
        /// Path to trace file
        #[arg(short, long)]
        trace: PathBuf,
        /// Step codes: 0 hold, 1 forward, -1 backward, other jump to end
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        steps: Vec<i64>,
        /// Fail FORWARD on the last cycle instead of staying there
        #[arg(long)]
        no_clamp: bool,
        /// Reject step codes other than -1, 0 and 1
        #[arg(long)]
        strict_directives: bool,
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("retrace=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Inspect { trace } => {
            let store = TraceStore::load(&trace)
                .wrap_err_with(|| format!("loading trace {}", trace.display()))?;
            let log = store.read()?;
            let summary = serde_json::json!({
                "total": log.total(),
                "markers": log.marker_count(),
                "instr": log.roster(),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
            Ok(())
        }
        Commands::Replay {
            listing,
            trace,
            steps,
            no_clamp,
            strict_directives,
            pretty,
        } => {
            let config = ReplayConfig {
                boundary: if no_clamp {
                    BoundaryPolicy::Strict
                } else {
                    BoundaryPolicy::Clamp
                },
                directives: if strict_directives {
                    DirectivePolicy::Strict
                } else {
                    DirectivePolicy::Legacy
                },
                store: StoreConfig::default(),
            };
            let mut cursor = ReplayCursor::open_with_config(&listing, &trace, config)
                .wrap_err_with(|| format!("opening trace {}", trace.display()))?;

            if steps.is_empty() {
                let snapshot = cursor.reset()?;
                return emit(out, &snapshot, pretty);
            }
            for code in steps {
                let snapshot = cursor
                    .query_code(code)
                    .wrap_err_with(|| format!("step {} from cycle {}", code, cursor.position()))?;
                emit(out, &snapshot, pretty)?;
            }
            Ok(())
        }
    }
}

fn emit(out: &mut impl Write, snapshot: &Snapshot, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(snapshot)?
    } else {
        serde_json::to_string(snapshot)?
    };
    writeln!(out, "{}", text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Files {
        _dir: tempfile::TempDir,
        listing: PathBuf,
        trace: PathBuf,
    }

    fn files() -> Files {
        let dir = tempfile::tempdir().unwrap();
        let listing = dir.path().join("input.s");
        let trace = dir.path().join("state.txt");
        std::fs::write(&listing, "lw 1,0,8\nhalt\n").unwrap();
        std::fs::write(
            &trace,
            "instr=8454152\nCycle=1\nRS1=busy\nCycle=2\nRS1=free\n2",
        )
        .unwrap();
        Files {
            _dir: dir,
            listing,
            trace,
        }
    }

    fn run_args(args: &[&str]) -> Result<Vec<serde_json::Value>> {
        let cli = Cli::try_parse_from(args)?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        let text = String::from_utf8(out)?;
        Ok(text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect())
    }

    #[test]
    fn test_replay_steps() {
        let f = files();
        let values = run_args(&[
            "retrace",
            "replay",
            "--listing",
            f.listing.to_str().unwrap(),
            "--trace",
            f.trace.to_str().unwrap(),
            "--steps",
            "1,1,-1",
        ])
        .unwrap();

        let cycles: Vec<u64> = values.iter().map(|v| v["cycle"].as_u64().unwrap()).collect();
        assert_eq!(cycles, vec![1, 2, 1]);
        assert_eq!(values[1]["done"], true);
        assert_eq!(values[2]["RS1"], "busy");
    }

    #[test]
    fn test_replay_without_steps_prints_cycle_zero() {
        let f = files();
        let values = run_args(&[
            "retrace",
            "replay",
            "-l",
            f.listing.to_str().unwrap(),
            "-t",
            f.trace.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["cycle"], 0);
    }

    #[test]
    fn test_replay_strict_directive_fails() {
        let f = files();
        let result = run_args(&[
            "retrace",
            "replay",
            "-l",
            f.listing.to_str().unwrap(),
            "-t",
            f.trace.to_str().unwrap(),
            "--steps",
            "7",
            "--strict-directives",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inspect() {
        let f = files();
        let cli = Cli::try_parse_from(["retrace", "inspect", "-t", f.trace.to_str().unwrap()])
            .unwrap();
        let mut out = Vec::new();
        run(cli, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["markers"], 2);
        assert_eq!(value["instr"][0], "8454152");
    }

    #[test]
    fn test_negative_single_step_parses() {
        let cli = Cli::try_parse_from([
            "retrace", "replay", "-l", "a", "-t", "b", "--steps", "-1",
        ])
        .unwrap();
        match cli.command {
            Commands::Replay { steps, .. } => assert_eq!(steps, vec![-1]),
            Commands::Inspect { .. } => panic!("expected replay"),
        }
    }
}
