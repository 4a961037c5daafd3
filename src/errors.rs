//! Error types

use std::path::PathBuf;

use snafu::{prelude::*, Backtrace};

/// Failures of a single integer cell.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum StoreError {
    #[snafu(display("Failed to open {} for {mode}: {source}", path.display()))]
    Unavailable {
        path: PathBuf,
        mode: &'static str,
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Unexpected IO error on {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

/// Failures while moving the backlight to a new level.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum FadeError {
    #[snafu(display("Write failed during transition: {source}"), context(false))]
    Store { source: StoreError },
    #[snafu(display("Pacing sleep failed: {source}"))]
    Pace {
        source: nix::Error,
        backtrace: Backtrace,
    },
}

/// Failures of the single instance lock.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum LockError {
    #[snafu(display("Failed to open lock file {}: {source}", path.display()))]
    LockOpen {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Locking {} would deadlock", path.display()))]
    Deadlock { path: PathBuf, backtrace: Backtrace },
    #[snafu(display("Lock on {} is unavailable: {source}", path.display()))]
    Contended {
        path: PathBuf,
        source: nix::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Unexpected error locking {}: {source}", path.display()))]
    LockFcntl {
        path: PathBuf,
        source: nix::Error,
        backtrace: Backtrace,
    },
}

/// The device reported values we refuse to work with.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum DeviceError {
    #[snafu(display("Failed to read backlight: {source}"), context(false))]
    Read { source: StoreError },
    #[snafu(display("Maximum brightness {max} is not positive"))]
    InvalidMax { max: i64, backtrace: Backtrace },
    #[snafu(display("Current brightness {current} is outside 0..={max}"))]
    OutOfRange {
        current: i64,
        max: u32,
        backtrace: Backtrace,
    },
}
