//! The countdown-then-consume loop.

use mem_eater_telemetry::{self as telemetry, TelemetrySource};
use std::convert::Infallible;
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::arena::BlockArena;
use crate::config::HarnessConfig;
use crate::countdown::{Countdown, Phase};
use crate::error::ConfigError;
use crate::render::StatusRenderer;

/// Delay between countdown redraws
pub const COUNTDOWN_PACING: Duration = Duration::from_millis(50);

/// Blocks between debug progress events
const PROGRESS_EVERY_BLOCKS: usize = 64;

/// Drives a harness run: countdown, then sample/render/acquire forever.
pub struct Harness<S, W: Write> {
    config: HarnessConfig,
    telemetry: S,
    renderer: StatusRenderer<W>,
    arena: BlockArena,
}

impl<S: TelemetrySource, W: Write> Harness<S, W> {
    pub fn new(config: HarnessConfig, telemetry: S, out: W) -> Result<Self, ConfigError> {
        config.validate()?;
        let arena = BlockArena::new(config.block_size_bytes);
        Ok(Self {
            config,
            telemetry,
            renderer: StatusRenderer::new(out),
            arena,
        })
    }

    /// Runs until the process is killed.
    ///
    /// Only returns on a telemetry failure. The harness keeps ownership of
    /// every acquired block, so a caller that exits without dropping it
    /// releases nothing.
    pub fn run(&mut self) -> telemetry::Result<Infallible> {
        info!(
            countdown_secs = self.config.countdown_seconds,
            pressure = self.config.enable_pressure_metric,
            block_size = self.config.block_size_bytes,
            "mem-eater armed"
        );
        self.count_down();
        debug!("countdown finished, consuming memory");
        loop {
            self.step()?;
        }
    }

    /// Redraws the countdown until it runs out.
    pub fn count_down(&mut self) {
        let countdown = Countdown::start(self.config.countdown());
        loop {
            let now = Instant::now();
            let remaining = countdown.remaining_at(now);
            self.display(|renderer| renderer.render_countdown(remaining));
            if countdown.phase_at(now) == Phase::Consuming {
                return;
            }
            thread::sleep(COUNTDOWN_PACING);
        }
    }

    /// One consuming iteration: sample, redraw, take one more block.
    pub fn step(&mut self) -> telemetry::Result<()> {
        let sample = self.telemetry.read_memory_sample();
        self.display(|renderer| renderer.clear_padding());
        let sample = sample?;

        let pressure = if self.config.enable_pressure_metric {
            Some(self.telemetry.read_pressure_metric()?)
        } else {
            None
        };

        self.display(|renderer| renderer.render_status(&sample, pressure));

        self.arena.acquire();
        if self.arena.len() % PROGRESS_EVERY_BLOCKS == 0 {
            debug!(
                blocks = self.arena.len(),
                consumed_mib = self.arena.consumed_mib(),
                available_mib = sample.available_memory_mib,
                swap_free_mib = sample.available_swap_mib,
                "consumption progress"
            );
        }
        Ok(())
    }

    pub fn arena(&self) -> &BlockArena {
        &self.arena
    }

    pub fn renderer(&self) -> &StatusRenderer<W> {
        &self.renderer
    }

    pub fn telemetry(&self) -> &S {
        &self.telemetry
    }

    // The status line is cosmetic; a closed or broken stdout must not stop consumption.
    fn display(&mut self, draw: impl FnOnce(&mut StatusRenderer<W>) -> io::Result<()>) {
        if let Err(err) = draw(&mut self.renderer) {
            debug!(error = %err, "status line write failed");
        }
    }
}
