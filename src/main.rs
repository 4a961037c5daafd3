//! Display backlight control. Reads, sets, increments or decrements the
//! brightness of a sysfs backlight, fading smoothly between levels.
//!
//! There is no public code API for you to use! However, the command line
//! interface should be stable.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use backlight::Backlight;
use fade::{NanoSleepPacer, Transition};
use lock::InstanceLock;
use session::Session;

mod backlight;
mod errors;
mod fade;
mod flags;
mod lock;
mod notify;
mod policy;
mod session;
mod state;
mod store;
mod toggle;

fn main() -> anyhow::Result<ExitCode> {
    let cli = flags::Cli::parse();
    init_logging(cli.verbose);

    let program = std::env::current_exe()
        .and_then(|p| p.canonicalize())
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_PKG_NAME")));
    let options = cli.options(&program);
    let backlight = Backlight::new(cli.device.clone());

    // Held until the transition is done, released on every path out.
    let lock = InstanceLock::acquire(&cli.lock_file).context("Failed lock")?;
    let transition = Transition::new(cli.fade_config(), NanoSleepPacer);
    let report = Session::new(&options, &backlight, transition)
        .run()
        .with_context(|| format!("Failed to use backlight {}", backlight.path().display()))?;
    drop(lock);

    report.print();
    Ok(report.exit_code())
}

/// Warnings by default, everything with `--verbose`. `RUST_LOG` wins.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
