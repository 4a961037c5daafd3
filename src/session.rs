//! One invocation: work out the change, apply it and describe what happened.

use std::{path::PathBuf, process::ExitCode};

use log::{debug, warn};

use crate::{
    backlight::Backlight,
    errors::{DeviceError, FadeError},
    fade::{Pacer, Transition, WriteOutcome},
    notify::{IconCategory, Notification},
    policy::clamp,
    state::BrightnessState,
    store::{FileCell, ScalarStore},
    toggle::ToggleMemory,
};

/// The change requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Toggle,
    Increment(u32),
    Decrement(u32),
    Set(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// Parsed command line, fixed for the whole run.
#[derive(Debug, Clone)]
pub(crate) struct Options {
    pub operation: Option<Operation>,
    pub verbosity: Verbosity,
    pub notify: bool,
    /// Print only the icon path.
    pub icon_path_only: bool,
    /// Values of `operation` are percentages of max.
    pub percent: bool,
    /// Brightness never goes below this except when toggling off.
    pub lower_limit: u32,
    pub state_file: PathBuf,
    pub icon_dir: PathBuf,
    /// Running executable, used in permission hints.
    pub program: PathBuf,
}

impl Options {
    /// No flags at all: just show the current values.
    pub(crate) fn is_bare(&self) -> bool {
        self.operation.is_none()
            && self.verbosity == Verbosity::Normal
            && !self.notify
            && !self.icon_path_only
            && !self.percent
    }

    fn passive_count(&self) -> usize {
        [
            self.verbosity == Verbosity::Verbose,
            self.verbosity == Verbosity::Quiet,
            self.notify,
            self.icon_path_only,
            self.percent,
        ]
        .into_iter()
        .filter(|flag| *flag)
        .count()
    }
}

/// Lines to print and whether the run succeeded.
#[derive(Debug, Default)]
pub(crate) struct Report {
    lines: Vec<String>,
    failed: bool,
}

impl Report {
    fn say(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    #[cfg(test)]
    pub(crate) fn lines(&self) -> &[String] {
        &self.lines
    }

    #[cfg(test)]
    pub(crate) fn is_success(&self) -> bool {
        !self.failed
    }

    pub(crate) fn print(&self) {
        for line in &self.lines {
            println!("{line}");
        }
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        if self.failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Signed change derived from the operation, before clamping.
#[derive(Debug)]
struct Request {
    delta: i64,
    toggle_off: bool,
    action: &'static str,
}

/// What happened to the brightness cell.
#[derive(Debug)]
enum Applied {
    /// The cell cannot be opened for writing.
    Unwritable,
    /// Nothing needed to be written.
    Unchanged,
    Written(usize),
    Failed(FadeError),
}

pub(crate) struct Session<'a, P> {
    options: &'a Options,
    backlight: &'a Backlight,
    transition: Transition<P>,
}

impl<'a, P: Pacer> Session<'a, P> {
    pub(crate) fn new(options: &'a Options, backlight: &'a Backlight, transition: Transition<P>) -> Self {
        Self {
            options,
            backlight,
            transition,
        }
    }

    /// Run the requested operation against the backlight.
    ///
    /// Only unusable device readings are errors. Everything else, including a
    /// failed write, ends up in the report.
    pub(crate) fn run(&mut self) -> Result<Report, DeviceError> {
        let options = self.options;
        let state = self.backlight.read_state()?;
        debug!("State: {state:?}");
        let mut report = Report::default();

        if options.is_bare() {
            report.say(format!("Max brightness = {}", state.max));
            report.say(format!("Current brightness = {}", state.current));
            return Ok(report);
        }

        let verbose = options.verbosity == Verbosity::Verbose;
        let quiet = options.verbosity == Verbosity::Quiet || options.icon_path_only;
        if verbose {
            report.say(format!(
                "Arguments parsed = {} Passive, {} NonPassive",
                options.passive_count(),
                usize::from(options.operation.is_some())
            ));
        }

        let writable = self.backlight.is_writable();
        if !writable && !verbose && !options.icon_path_only {
            if !quiet {
                report.say("Unable to set brightness, check permissions. -v for more info. Exiting...");
            }
            report.failed = true;
            return Ok(report);
        }

        let request = self.request(&state, quiet, &mut report);
        let clamped = clamp(
            state.current,
            state.max,
            request.delta,
            options.lower_limit,
            request.toggle_off,
        );
        debug!("Request: {request:?}, clamped: {clamped:?}");
        let summary = self.summary(&state, request.action, clamped.target, clamped.delta);

        if verbose || options.notify || options.icon_path_only {
            let category = IconCategory::for_level(clamped.target, state.max);
            let icon = category.icon_path(&options.icon_dir);
            if options.icon_path_only {
                report.say(icon.display().to_string());
            }
            if writable && clamped.delta != 0 && options.notify {
                Notification {
                    icon: icon.clone(),
                    percent: state.percent_of(clamped.target),
                    summary: summary.clone(),
                }
                .send();
            }
            if verbose {
                report.say(format!("Path = {}", options.icon_dir.display()));
                report.say(format!("Icon path = {}", icon.display()));
            }
        }

        let applied = if !writable {
            Applied::Unwritable
        } else if clamped.delta != 0 || verbose {
            let mut cell = self.backlight.brightness_cell();
            match self.transition.run(&mut cell, state.current, clamped.delta) {
                Ok(WriteOutcome::NoOp) => Applied::Unchanged,
                Ok(WriteOutcome::Written(bytes)) => Applied::Written(bytes),
                Err(err) => {
                    warn!("Transition failed: {err}");
                    Applied::Failed(err)
                }
            }
        } else {
            Applied::Unchanged
        };
        report.failed = matches!(applied, Applied::Unwritable | Applied::Failed(_));
        if quiet {
            return Ok(report);
        }

        let reached = self.reached_limit(&state, request.delta);
        if verbose {
            let level = match applied {
                Applied::Written(_) => clamped.target,
                _ => state.current,
            };
            report.say(format!("Max brightness = {}", state.max));
            report.say(self.current_line(&state, level));
            match applied {
                Applied::Unchanged => {
                    report.say(reached.unwrap_or_else(|| "No change in brightness".to_string()));
                }
                Applied::Unwritable | Applied::Failed(FadeError::Store { .. }) => {
                    let cell = self.backlight.brightness_cell();
                    let program = options.program.display();
                    report.say(format!("Cannot write to {}", cell.path().display()));
                    report.say(format!("Make sure {program} is owned by root."));
                    report.say(format!("If so, try \"sudo chmod u+s {program}\""));
                }
                Applied::Failed(ref err @ FadeError::Pace { .. }) => {
                    report.say(format!("Pacing error: {err}"));
                }
                Applied::Written(bytes) => {
                    report.say(format!("Characters written = {bytes}"));
                    report.say(summary);
                }
            }
        } else if report.failed {
            report.say("Unable to set brightness, -v for more info. Exiting...");
        } else if let Applied::Written(_) = applied {
            report.say(format!("Max brightness = {}", state.max));
            report.say(self.current_line(&state, clamped.target));
            report.say(summary);
        } else if options.operation.is_some() {
            if let Some(line) = reached {
                report.say(line);
            }
        }
        Ok(report)
    }

    /// Work out the unclamped change for the requested operation.
    fn request(&self, state: &BrightnessState, quiet: bool, report: &mut Report) -> Request {
        let native = |value: u32| {
            if self.options.percent {
                state.from_percent(value)
            } else {
                value
            }
        };
        let current = i64::from(state.current);
        match self.options.operation {
            None => Request {
                delta: 0,
                toggle_off: false,
                action: "Unchanged at ",
            },
            Some(Operation::Toggle) => {
                let mut memory = ToggleMemory::new(FileCell::new(&self.options.state_file));
                if state.current == 0 {
                    Request {
                        delta: memory.restore_or_default().into(),
                        toggle_off: false,
                        action: "Toggled on, set to ",
                    }
                } else if let Err(err) = memory.save(state.current) {
                    warn!("Failed to save brightness: {err}");
                    if !quiet {
                        report.say("Couldn't store current brightness, aborting toggle");
                    }
                    Request {
                        delta: 0,
                        toggle_off: false,
                        action: "Toggle aborted at ",
                    }
                } else {
                    Request {
                        delta: -current,
                        toggle_off: true,
                        action: "Toggled off, saved previous brightness as ",
                    }
                }
            }
            Some(Operation::Increment(value)) => Request {
                delta: native(value).into(),
                toggle_off: false,
                action: "Incremented by ",
            },
            Some(Operation::Decrement(value)) => Request {
                delta: -i64::from(native(value)),
                toggle_off: false,
                action: "Decremented by ",
            },
            Some(Operation::Set(value)) => Request {
                delta: i64::from(native(value)) - current,
                toggle_off: false,
                action: "Set to ",
            },
        }
    }

    /// Human readable description, e.g. `Decremented by 50 (6%)`.
    fn summary(&self, state: &BrightnessState, action: &str, target: u32, delta: i64) -> String {
        let value = match self.options.operation {
            Some(Operation::Set(_)) => target,
            _ => u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX),
        };
        if self.options.percent {
            format!("{action}{value} ({}%)", state.percent_of(value))
        } else {
            format!("{action}{value}")
        }
    }

    fn current_line(&self, state: &BrightnessState, level: u32) -> String {
        if self.options.percent {
            format!("Current brightness = {level} ({}%)", state.percent_of(level))
        } else {
            format!("Current brightness = {level}")
        }
    }

    /// Explain a request that left the level unchanged because of a bound.
    fn reached_limit(&self, state: &BrightnessState, requested_delta: i64) -> Option<String> {
        let requested = i64::from(state.current).saturating_add(requested_delta);
        let lower_limit = i64::from(self.options.lower_limit);
        let at_max = match self.options.operation? {
            Operation::Toggle => return None,
            Operation::Increment(_) => true,
            Operation::Decrement(_) => false,
            Operation::Set(_) if requested > i64::from(state.max) => true,
            Operation::Set(_) if requested == 0 || requested < lower_limit => false,
            Operation::Set(_) => return None,
        };
        if at_max {
            Some(format!("Reached maximum brightness: {}", state.max))
        } else if lower_limit > 0 {
            Some("Reached minimum brightness, -t to turn off".to_string())
        } else {
            Some("Reached minimum brightness".to_string())
        }
    }
}
