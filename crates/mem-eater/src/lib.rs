//! mem-eater command line front-end

use anyhow::{Context, Result};
use mem_eater_core::config::MIB;
use mem_eater_core::HarnessConfig;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// Re-export CLI types for testing
pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "mem-eater")]
#[command(about = "Steadily consumes system memory so an OOM reaper can be watched in action")]
#[command(version, long_about = None)]
pub struct Cli {
    /// JSON harness configuration; missing fields take the PSI preset values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use the basic preset: longer countdown and no memory pressure sampling
    #[arg(long)]
    pub no_pressure: bool,

    /// Seconds to wait before consuming memory
    #[arg(long, value_name = "SECS")]
    pub countdown: Option<u64>,

    /// Size of each acquired block in MiB
    #[arg(long, value_name = "MIB")]
    pub block_size_mib: Option<usize>,

    /// Alternative meminfo source
    #[arg(long, value_name = "PATH")]
    pub meminfo: Option<PathBuf>,

    /// Alternative memory pressure source
    #[arg(long, value_name = "PATH")]
    pub pressure: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Builds the run configuration: preset, then config file, then individual flags.
    pub fn resolve_config(&self) -> Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None if self.no_pressure => HarnessConfig::basic(),
            None => HarnessConfig::with_pressure(),
        };

        if self.no_pressure {
            config.enable_pressure_metric = false;
        }
        if let Some(secs) = self.countdown {
            config.countdown_seconds = secs;
        }
        if let Some(mib) = self.block_size_mib {
            config.block_size_bytes = mib
                .checked_mul(MIB)
                .with_context(|| format!("block size of {mib} MiB is too large"))?;
        }
        if let Some(path) = &self.meminfo {
            config.telemetry.meminfo = path.clone();
        }
        if let Some(path) = &self.pressure {
            config.telemetry.pressure = path.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Logs go to stderr; stdout belongs to the status line.
pub fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}
