//! Harness configuration and its compiled-in presets.

use mem_eater_telemetry::TelemetryPaths;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

pub const MIB: usize = 1024 * 1024;

/// Configuration for a harness run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Seconds to wait before consumption begins, giving the operator a chance to abort
    pub countdown_seconds: u64,
    /// Whether to sample and display the memory pressure stall average
    pub enable_pressure_metric: bool,
    /// Size of each block acquired per iteration
    pub block_size_bytes: usize,
    /// Where memory and pressure telemetry is read from
    pub telemetry: TelemetryPaths,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::with_pressure()
    }
}

impl HarnessConfig {
    /// Short countdown, status line includes PSI
    pub fn with_pressure() -> Self {
        Self {
            countdown_seconds: 4,
            enable_pressure_metric: true,
            block_size_bytes: MIB,
            telemetry: TelemetryPaths::default(),
        }
    }

    /// Longer countdown, memory and swap only. Works on kernels without PSI.
    pub fn basic() -> Self {
        Self {
            countdown_seconds: 10,
            enable_pressure_metric: false,
            ..Self::with_pressure()
        }
    }

    pub fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size_bytes == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        Ok(())
    }
}
