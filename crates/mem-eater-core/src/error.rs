//! Error types for harness setup.

use thiserror::Error;

/// Errors raised while validating a harness configuration, before any memory
/// is consumed
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("block size must be at least one byte")]
    ZeroBlockSize,
}
