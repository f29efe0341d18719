//! Pre-consumption countdown.

use std::time::{Duration, Instant};

/// Harness phase. `Counting` only ever moves to `Consuming`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Counting,
    Consuming,
}

/// Wall-clock countdown measured from a fixed start instant
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    started: Instant,
    duration: Duration,
}

impl Countdown {
    pub fn start(duration: Duration) -> Self {
        Self::starting_at(Instant::now(), duration)
    }

    pub fn starting_at(started: Instant, duration: Duration) -> Self {
        Self { started, duration }
    }

    /// Seconds left at `now`; zero or negative once the countdown has run out.
    pub fn remaining_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started);
        self.duration.as_secs_f64() - elapsed.as_secs_f64()
    }

    pub fn phase_at(&self, now: Instant) -> Phase {
        if self.remaining_at(now) > 0.0 {
            Phase::Counting
        } else {
            Phase::Consuming
        }
    }
}
