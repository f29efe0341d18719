//! Reaper enforcement orchestrator
//! Launches mem-eater with no countdown and waits to see whether an OOM reaper
//! (or the kernel OOM killer) terminates it before the timeout.
//!
//! Run this only on a machine you are prepared to push into memory pressure.

use anyhow::{bail, Context, Result};
use clap::Parser;
use mem_eater_telemetry::{ProcfsTelemetry, TelemetrySource};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "reaper-orchestrator")]
#[command(about = "Checks that an OOM reaper kills a runaway mem-eater")]
struct Args {
    /// Path to the mem-eater binary (defaults to the one next to this executable)
    #[arg(long)]
    eater: Option<PathBuf>,

    /// Seconds to wait for the reaper before giving up
    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    /// Run mem-eater without memory pressure sampling
    #[arg(long)]
    no_pressure: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    /// Killed by a signal: the reaper or the kernel stepped in
    Reaped { signal: i32 },
    /// Exited on its own, e.g. telemetry was unavailable
    Exited { code: Option<i32> },
    /// Still alive at the deadline
    TimedOut,
}

impl Outcome {
    fn from_status(status: ExitStatus) -> Self {
        match status.signal() {
            Some(signal) => Outcome::Reaped { signal },
            None => Outcome::Exited {
                code: status.code(),
            },
        }
    }
}

fn default_eater_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    let exe_dir = exe_path.parent().unwrap_or(exe_path.as_path());
    Ok(exe_dir.join("mem-eater"))
}

fn run_reaper_test(eater: &Path, timeout: Duration, no_pressure: bool) -> Result<Outcome> {
    let mut cmd = Command::new(eater);
    cmd.args(["--countdown", "0"])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit());
    if no_pressure {
        cmd.arg("--no-pressure");
    }

    info!(command = ?cmd, timeout_secs = timeout.as_secs(), "launching mem-eater");
    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to start {}", eater.display()))?;
    info!(pid = child.id(), "mem-eater started");

    let start_time = Instant::now();
    let mut last_check = Instant::now();
    let mut telemetry = ProcfsTelemetry::default();

    loop {
        if let Some(status) = child.try_wait()? {
            let outcome = Outcome::from_status(status);
            info!(
                elapsed_secs = start_time.elapsed().as_secs_f64(),
                ?outcome,
                "mem-eater finished"
            );
            return Ok(outcome);
        }

        if start_time.elapsed() > timeout {
            warn!(
                timeout_secs = timeout.as_secs(),
                "mem-eater outlived the timeout - terminating it"
            );
            let _ = child.kill();
            let _ = child.wait();
            return Ok(Outcome::TimedOut);
        }

        if last_check.elapsed() > Duration::from_secs(1) {
            match telemetry.read_memory_sample() {
                Ok(sample) => info!(
                    elapsed_secs = start_time.elapsed().as_secs(),
                    available_mib = sample.available_memory_mib,
                    swap_free_mib = sample.available_swap_mib,
                    "mem-eater still running"
                ),
                Err(err) => warn!(error = %err, "could not sample system memory"),
            }
            last_check = Instant::now();
        }

        thread::sleep(Duration::from_millis(100));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let eater = match args.eater {
        Some(path) => path,
        None => default_eater_path()?,
    };
    if !eater.exists() {
        bail!(
            "mem-eater binary not found at {} (build it with `cargo build --bin mem-eater`)",
            eater.display()
        );
    }

    let outcome = run_reaper_test(
        &eater,
        Duration::from_secs(args.timeout_secs),
        args.no_pressure,
    )?;

    match outcome {
        Outcome::Reaped { signal } => {
            info!(signal, "PASSED - mem-eater was reaped");
            Ok(())
        }
        Outcome::Exited { code } => {
            bail!("UNCLEAR - mem-eater exited by itself with code {code:?}")
        }
        Outcome::TimedOut => bail!("FAILED - nothing reaped mem-eater before the timeout"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_status_counts_as_reaped() {
        // Raw wait status for a process terminated by SIGKILL.
        let status = ExitStatus::from_raw(9);
        assert_eq!(Outcome::from_status(status), Outcome::Reaped { signal: 9 });
    }

    #[test]
    fn test_exit_code_status_counts_as_exited() {
        // Raw wait status for `exit(1)`.
        let status = ExitStatus::from_raw(1 << 8);
        assert_eq!(Outcome::from_status(status), Outcome::Exited { code: Some(1) });
    }
}
