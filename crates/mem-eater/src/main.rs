use anyhow::{Context, Result};
use mem_eater::{init_tracing, Cli, Parser};
use mem_eater_core::Harness;
use mem_eater_telemetry::ProcfsTelemetry;
use std::io;
use tracing::error;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = cli.resolve_config()?;
    let telemetry = ProcfsTelemetry::new(config.telemetry.clone());
    let mut harness =
        Harness::new(config, telemetry, io::stdout()).context("invalid harness configuration")?;

    match harness.run() {
        Ok(never) => match never {},
        Err(err) => {
            // Finish the status line so the diagnostic starts on its own.
            println!();
            error!(
                error = %err,
                blocks = harness.arena().len(),
                consumed_mib = harness.arena().consumed_mib(),
                "memory telemetry unavailable, exiting"
            );
            // Exit with the harness still alive: no unwinding, nothing freed.
            std::process::exit(1);
        }
    }
}
