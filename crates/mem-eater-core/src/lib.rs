//! Memory exhaustion harness for exercising out-of-memory reapers.
//!
//! After a short countdown the [`Harness`] samples memory telemetry, redraws a
//! status line and grabs another zero-filled block, forever. Nothing it takes
//! is ever given back; the run ends when an operator interrupts it or the
//! kernel (or the reaper under test) kills the process.

pub mod arena;
pub mod config;
pub mod countdown;
pub mod error;
pub mod harness;
pub mod render;

pub use arena::BlockArena;
pub use config::HarnessConfig;
pub use countdown::{Countdown, Phase};
pub use harness::Harness;
pub use render::StatusRenderer;
