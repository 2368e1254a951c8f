//! L1 data cache model CLI.
//!
//! This binary drives the cycle-level cache model from the command line. It performs:
//! 1. **Trace run:** Replay a trace of reads and writes and print the statistics.
//! 2. **Config check:** Resolve a configuration and print the derived geometry.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use l1d_core::Simulator;
use l1d_core::common::SimError;
use l1d_core::config::Config;
use l1d_core::sim::load_trace;

#[derive(Parser, Debug)]
#[command(
    name = "l1d",
    author,
    version,
    about = "Cycle-level 2-way L1 data cache model",
    long_about = "Replay memory access traces through a cycle-level model of a 2-way set-associative write-back data cache.\n\nTrace lines are `R <addr>` or `W <addr> <data>`; `#` starts a comment.\n\nExamples:\n  l1d run --trace traces/stream.trc\n  l1d run --trace traces/stream.trc --config small.json --json\n  l1d show-config --config small.json"
)]
struct Cli {
    /// Raise the log level (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace file through the cache.
    Run {
        /// Trace file to replay.
        #[arg(short, long)]
        trace: PathBuf,

        /// JSON configuration; defaults are used for anything missing.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved configuration and cache geometry.
    ShowConfig {
        /// JSON configuration; defaults are used for anything missing.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            trace,
            config,
            json,
        } => cmd_run(&trace, config.as_deref(), json),
        Commands::ShowConfig { config } => cmd_show_config(config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config, SimError> {
    path.map_or_else(|| Ok(Config::default()), Config::load)
}

/// Replays `trace` through a fresh simulator and prints the report.
fn cmd_run(trace: &Path, config: Option<&Path>, json: bool) -> Result<(), SimError> {
    let config = load_config(config)?;
    let accesses = load_trace(trace)?;
    let mut sim = Simulator::new(&config)?;
    info!(trace = %trace.display(), requests = accesses.len(), "trace loaded");

    if !json {
        let g = sim.cache.geometry();
        println!(
            "[*] {} sets x 2 ways x {} B blocks, {}-bit addresses, prefetcher {:?}",
            g.num_sets(),
            g.block_bytes(),
            g.address_bits(),
            config.cache.prefetcher
        );
        println!("[*] Replaying {} requests from {}", accesses.len(), trace.display());
    }

    let report = sim.run(&accesses)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}

/// Prints the configuration with its derived geometry as JSON.
fn cmd_show_config(config: Option<&Path>) -> Result<(), SimError> {
    let config = load_config(config)?;
    let geometry = config.cache.geometry()?;
    let doc = serde_json::json!({
        "config": config,
        "geometry": geometry,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
