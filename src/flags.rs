//! Command line parsing
use std::path::{Path, PathBuf};

use clap::ArgGroup;

use crate::{
    backlight::DEFAULT_DEVICE,
    fade::{FadeConfig, DEFAULT_FADE_STEP, DEFAULT_FADE_TIME_MS},
    lock::DEFAULT_LOCK_FILE,
    session::{Operation, Options, Verbosity},
    toggle::STATE_FILE_NAME,
};

#[derive(Debug, clap::Parser)]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("operation").args(["toggle", "inc", "dec", "set"])))]
/// Read, set, increment, or decrement the display backlight.
///
/// Without any flags the current and maximum brightness are printed.
pub(crate) struct Cli {
    /// Produce verbose output
    #[clap(short, long, conflicts_with_all = ["quiet", "iconpath"])]
    pub verbose: bool,
    /// Produce no output
    #[clap(short, long)]
    pub quiet: bool,
    /// Send a desktop notification
    #[clap(short, long)]
    pub notify: bool,
    /// Output ONLY the path to the icon
    #[clap(short = 'I', long)]
    pub iconpath: bool,
    /// Interpret the integer as a percentage of the maximum
    #[clap(short, long)]
    pub percent: bool,
    /// Toggle backlight off and back on
    #[clap(short, long)]
    pub toggle: bool,
    /// Increment
    #[clap(short, long, value_name = "INT")]
    pub inc: Option<u32>,
    /// Decrement
    #[clap(short, long, value_name = "INT")]
    pub dec: Option<u32>,
    /// Set
    #[clap(short, long, value_name = "INT")]
    pub set: Option<u32>,
    /// Backlight directory containing `brightness` and `max_brightness`.
    #[clap(long, value_name = "DIR", default_value = DEFAULT_DEVICE)]
    pub device: PathBuf,
    /// File used to keep concurrent invocations apart.
    #[clap(long, value_name = "PATH", default_value = DEFAULT_LOCK_FILE)]
    pub lock_file: PathBuf,
    /// Where the brightness before toggling off is kept.
    /// Defaults to `prev_brightness` next to the executable.
    #[clap(long, value_name = "PATH")]
    pub state_file: Option<PathBuf>,
    /// Directory with notification icons. Defaults to the executable's directory.
    #[clap(long, value_name = "DIR")]
    pub icon_dir: Option<PathBuf>,
    /// Fraction of the change done per fade step (0 = single units, 0.5 = two
    /// steps). Outside 0..=0.5 disables fading.
    #[clap(long, value_name = "FRACTION", default_value_t = DEFAULT_FADE_STEP)]
    pub fade_step: f64,
    /// Duration of a fade in milliseconds. 0 disables fading.
    #[clap(long, value_name = "MS", default_value_t = DEFAULT_FADE_TIME_MS)]
    pub fade_time: u32,
    /// Brightness never goes below this, except when toggling off.
    #[clap(long, value_name = "INT", default_value_t = 1)]
    pub lower_limit: u32,
}

impl Cli {
    fn operation(&self) -> Option<Operation> {
        if self.toggle {
            Some(Operation::Toggle)
        } else if let Some(value) = self.inc {
            Some(Operation::Increment(value))
        } else if let Some(value) = self.dec {
            Some(Operation::Decrement(value))
        } else {
            self.set.map(Operation::Set)
        }
    }

    /// Freeze the parsed flags into the options for one session.
    pub(crate) fn options(&self, program: &Path) -> Options {
        let program_dir = program
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let verbosity = if self.verbose {
            Verbosity::Verbose
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        };
        Options {
            operation: self.operation(),
            verbosity,
            notify: self.notify,
            icon_path_only: self.iconpath,
            percent: self.percent,
            lower_limit: self.lower_limit,
            state_file: self
                .state_file
                .clone()
                .unwrap_or_else(|| program_dir.join(STATE_FILE_NAME)),
            icon_dir: self.icon_dir.clone().unwrap_or(program_dir),
            program: program.to_path_buf(),
        }
    }

    pub(crate) fn fade_config(&self) -> FadeConfig {
        FadeConfig::new(self.fade_step, self.fade_time)
    }
}
