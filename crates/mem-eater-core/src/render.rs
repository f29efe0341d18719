//! Single-line status display redrawn in place with a carriage return.

use mem_eater_telemetry::MemorySample;
use std::io::{self, Write};

/// Blank run written before each redraw to wipe the tail of a longer previous line
pub const CLEAR_PADDING_WIDTH: usize = 100;

pub fn format_status(sample: &MemorySample, pressure: Option<f32>) -> String {
    match pressure {
        Some(psi) => format!(
            "Free RAM: {} MiB. Free swap: {} MiB. PSI: {psi:.2}",
            sample.available_memory_mib, sample.available_swap_mib
        ),
        None => format!(
            "Free RAM: {} MiB. Free swap: {} MiB.",
            sample.available_memory_mib, sample.available_swap_mib
        ),
    }
}

pub fn format_countdown(remaining_secs: f64) -> String {
    format!(
        "mem-eater will start consuming system memory in: {:.2} secs. \
         Press Ctrl+C if you don't want that to happen.",
        remaining_secs.max(0.0)
    )
}

/// Writes the live status line. Every redraw is flushed immediately.
pub struct StatusRenderer<W: Write> {
    out: W,
}

impl<W: Write> StatusRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn render_status(&mut self, sample: &MemorySample, pressure: Option<f32>) -> io::Result<()> {
        self.redraw(&format_status(sample, pressure))
    }

    pub fn render_countdown(&mut self, remaining_secs: f64) -> io::Result<()> {
        self.redraw(&format_countdown(remaining_secs))
    }

    pub fn clear_padding(&mut self) -> io::Result<()> {
        write!(self.out, "{:width$}", "", width = CLEAR_PADDING_WIDTH)
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn redraw(&mut self, line: &str) -> io::Result<()> {
        write!(self.out, "\r{line}")?;
        self.out.flush()
    }
}
