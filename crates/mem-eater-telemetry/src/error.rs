//! Error types for telemetry reads.

use std::path::PathBuf;

use thiserror::Error;

/// Every variant means the harness lost sight of the system it is stressing.
/// Callers treat them all the same way: report and stop.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} ended before {missing} was found", path.display())]
    MissingFields { path: PathBuf, missing: String },

    #[error("malformed memory pressure data in {}: {reason}", path.display())]
    MalformedPressure { path: PathBuf, reason: String },
}
