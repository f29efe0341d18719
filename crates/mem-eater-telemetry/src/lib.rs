//! Live memory telemetry for the mem-eater harness.
//!
//! Reads available memory and free swap from `/proc/meminfo` and the short-term
//! memory pressure stall average from `/proc/pressure/memory`. Neither reader
//! retries or returns partial data.

pub mod error;

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, error::Error>;

pub const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";
pub const DEFAULT_PRESSURE_PATH: &str = "/proc/pressure/memory";

const MEM_AVAILABLE_LABEL: &str = "MemAvailable";
const SWAP_FREE_LABEL: &str = "SwapFree";
const PRESSURE_SOME_ROW: &str = "some";
const PRESSURE_AVG10_KEY: &str = "avg10=";

/// Point-in-time view of reclaimable memory and free swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySample {
    pub available_memory_mib: u64,
    pub available_swap_mib: u64,
}

impl MemorySample {
    fn from_kib(available_memory_kib: u64, available_swap_kib: u64) -> Self {
        Self {
            available_memory_mib: available_memory_kib / 1024,
            available_swap_mib: available_swap_kib / 1024,
        }
    }
}

/// Anything the consumption loop can pull telemetry from.
///
/// The live implementation is [`ProcfsTelemetry`]; tests substitute their own.
pub trait TelemetrySource {
    fn read_memory_sample(&mut self) -> Result<MemorySample>;

    /// Returns the `some avg10` memory pressure stall average.
    fn read_pressure_metric(&mut self) -> Result<f32>;
}

/// Locations of the text sources read by [`ProcfsTelemetry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryPaths {
    pub meminfo: PathBuf,
    pub pressure: PathBuf,
}

impl Default for TelemetryPaths {
    fn default() -> Self {
        Self {
            meminfo: PathBuf::from(DEFAULT_MEMINFO_PATH),
            pressure: PathBuf::from(DEFAULT_PRESSURE_PATH),
        }
    }
}

/// Reads telemetry from procfs (or files laid out the same way).
///
/// Sources are reopened on every read so each sample reflects the kernel's
/// current view.
#[derive(Debug, Clone, Default)]
pub struct ProcfsTelemetry {
    paths: TelemetryPaths,
}

impl ProcfsTelemetry {
    pub fn new(paths: TelemetryPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &TelemetryPaths {
        &self.paths
    }
}

impl TelemetrySource for ProcfsTelemetry {
    fn read_memory_sample(&mut self) -> Result<MemorySample> {
        let path = &self.paths.meminfo;
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        parse_meminfo(BufReader::new(file), path)
    }

    fn read_pressure_metric(&mut self) -> Result<f32> {
        let path = &self.paths.pressure;
        let contents = fs::read_to_string(path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        parse_pressure(&contents, path)
    }
}

/// Extracts `MemAvailable` and `SwapFree` from meminfo-formatted text.
///
/// Lines look like `MemAvailable:    2048 kB`. Scanning stops as soon as both
/// fields have been seen. `origin` only names the source in errors.
pub fn parse_meminfo<R: BufRead>(reader: R, origin: &Path) -> Result<MemorySample> {
    let mut available_kib = None;
    let mut swap_free_kib = None;

    for line in reader.lines() {
        let line = line.map_err(|source| Error::Read {
            path: origin.to_path_buf(),
            source,
        })?;

        match parse_meminfo_line(&line) {
            Some((MEM_AVAILABLE_LABEL, kib)) => available_kib = Some(kib),
            Some((SWAP_FREE_LABEL, kib)) => swap_free_kib = Some(kib),
            _ => {}
        }

        if available_kib.is_some() && swap_free_kib.is_some() {
            break;
        }
    }

    match (available_kib, swap_free_kib) {
        (Some(available), Some(swap)) => {
            trace!(available_kib = available, swap_free_kib = swap, "read meminfo");
            Ok(MemorySample::from_kib(available, swap))
        }
        (available, swap) => {
            let missing: Vec<&str> = [
                available.is_none().then_some(MEM_AVAILABLE_LABEL),
                swap.is_none().then_some(SWAP_FREE_LABEL),
            ]
            .into_iter()
            .flatten()
            .collect();
            Err(Error::MissingFields {
                path: origin.to_path_buf(),
                missing: missing.join(" and "),
            })
        }
    }
}

/// Splits `<Label>: <integer> [kB]` into its label and value.
fn parse_meminfo_line(line: &str) -> Option<(&str, u64)> {
    let (label, rest) = line.split_once(':')?;
    let rest = rest.trim();
    let value = rest.strip_suffix("kB").unwrap_or(rest).trim_end();
    Some((label.trim(), value.parse().ok()?))
}

/// Extracts the `avg10` value from the `some` row of a PSI file.
///
/// The data looks like:
/// ```text
/// some avg10=0.00 avg60=0.00 avg300=0.00 total=0
/// full avg10=0.00 avg60=0.00 avg300=0.00 total=0
/// ```
pub fn parse_pressure(contents: &str, origin: &Path) -> Result<f32> {
    let malformed = |reason: &str| Error::MalformedPressure {
        path: origin.to_path_buf(),
        reason: reason.to_string(),
    };

    let row = contents
        .lines()
        .find(|line| line.split_ascii_whitespace().next() == Some(PRESSURE_SOME_ROW))
        .ok_or_else(|| malformed("no `some` row"))?;

    let avg10 = row
        .split_ascii_whitespace()
        .find_map(|field| field.strip_prefix(PRESSURE_AVG10_KEY))
        .ok_or_else(|| malformed("no avg10 field in `some` row"))?;

    avg10
        .parse()
        .map_err(|err| malformed(&format!("avg10 value {avg10:?}: {err}")))
}
