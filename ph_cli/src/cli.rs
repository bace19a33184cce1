//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config file used when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG: &str = "etc/ph_config.toml";

#[derive(Parser, Debug)]
#[command(name = "ph", version, about = "pH regulation controller")]
pub struct Cli {
    /// Path to config TOML. Defaults to etc/ph_config.toml when present,
    /// otherwise built-in defaults.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Calibration CSV (headers: voltage,ph; exactly three rows).
    /// Overrides [calibration] in the config.
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Log as JSON lines instead of pretty, and keep stdout pure JSONL
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace). Overrides
    /// [logging] level; defaults to info when neither is set.
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop, one telemetry line per cycle on stdout
    Run {
        /// Stop after this many cycles (default: run until Ctrl-C)
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
    },
    /// Print the computed calibration (slope/intercept) and exit
    Calibration,
    /// Quick hardware check: stop pumps and take one probe reading
    SelfCheck,
}
