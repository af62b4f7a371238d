//! RETRACE Server
//!
//! Serves replay snapshots of a cycle trace over HTTP.

#![warn(missing_docs)]
#![warn(clippy::all)]

use anyhow::{Context, Result};
use clap::Parser;
use retrace_core::{BoundaryPolicy, DirectivePolicy};
use retrace_log::StoreConfig;
use retrace_replay::{ReplayConfig, ReplayCursor};
use retrace_server::{ApiServer, ServerConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "retrace-server")]
#[command(about = "RETRACE server", long_about = None)]
struct Args {
    /// Program listing shown next to every snapshot
    listing: PathBuf,
    /// Trace file produced by the simulator
    #[arg(short, long, default_value = "state.txt")]
    trace: PathBuf,
    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,
    /// Directory served under /static
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,
    /// Fail FORWARD on the last cycle instead of staying there
    #[arg(long)]
    no_clamp: bool,
    /// Reject step codes other than -1, 0 and 1
    #[arg(long)]
    strict_directives: bool,
    /// Reuse the parsed trace while its mtime and length are unchanged
    #[arg(long)]
    cache_by_mtime: bool,
    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn replay_config(&self) -> ReplayConfig {
        ReplayConfig {
            boundary: if self.no_clamp {
                BoundaryPolicy::Strict
            } else {
                BoundaryPolicy::Clamp
            },
            directives: if self.strict_directives {
                DirectivePolicy::Strict
            } else {
                DirectivePolicy::Legacy
            },
            store: StoreConfig {
                cache_by_mtime: self.cache_by_mtime,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("retrace=info,tower_http=debug"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let cursor = ReplayCursor::open_with_config(&args.listing, &args.trace, args.replay_config())
        .with_context(|| {
            format!(
                "opening listing {} and trace {}",
                args.listing.display(),
                args.trace.display()
            )
        })?;

    let config = ServerConfig {
        bind: args.bind,
        static_dir: args.static_dir,
    };
    ApiServer::new(config, cursor).serve().await?;

    Ok(())
}
