//! Fading the backlight between two levels.
//!
//! A fade is a series of direct writes to the brightness cell with a short
//! sleep in between, so the change is visible as a smooth ramp. The number of
//! steps depends on the step fraction, the sleep is scaled so the whole ramp
//! takes roughly the configured fade time.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use nix::{
    errno::Errno,
    sys::time::TimeSpec,
    time::{clock_nanosleep, ClockId, ClockNanosleepFlags},
};
use snafu::ResultExt;

use crate::{
    errors::{FadeError, PaceSnafu},
    store::ScalarStore,
};

/// Anything outside `0..=PHYSICAL_CEILING` is treated as corrupt input.
pub(crate) const PHYSICAL_CEILING: i64 = 1_000_000;

pub(crate) const DEFAULT_FADE_STEP: f64 = 0.1;
pub(crate) const DEFAULT_FADE_TIME_MS: u32 = 170;

/// How a fade is paced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FadeConfig {
    /// Fraction of the total change per step. 0 means single unit steps,
    /// 0.5 means two steps. Outside `0.0..=0.5` disables fading.
    pub step_fraction: f64,
    /// Wall clock time a fade should take, in ms. Outside `1..=999`
    /// disables fading.
    pub fade_time_ms: u32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            step_fraction: DEFAULT_FADE_STEP,
            fade_time_ms: DEFAULT_FADE_TIME_MS,
        }
    }
}

impl FadeConfig {
    pub(crate) fn new(step_fraction: f64, fade_time_ms: u32) -> Self {
        Self {
            step_fraction,
            fade_time_ms,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        (1..1000).contains(&self.fade_time_ms) && (0.0..=0.5).contains(&self.step_fraction)
    }

    /// Step size and sleep between steps for a change of `delta`.
    ///
    /// `None` means the change should be written in one go.
    fn plan(&self, delta: i64) -> Option<(i64, Duration)> {
        if !self.is_enabled() || delta == 0 {
            return None;
        }
        let step = if self.step_fraction == 0.0 {
            delta.signum()
        } else {
            ((delta as f64) * self.step_fraction).round() as i64
        };
        // Same sign as delta, never zero.
        let step = step.abs().max(1) * delta.signum();

        let steps = delta as f64 / step as f64;
        let fade_time = Duration::from_millis(self.fade_time_ms.into());
        let interval = Duration::from_nanos((fade_time.as_nanos() as f64 / steps).round() as u64);
        if interval.is_zero() {
            return None;
        }
        Some((step, interval))
    }
}

/// Sleeps between fade steps.
pub(crate) trait Pacer {
    fn pace(&mut self, interval: Duration) -> nix::Result<()>;
}

/// Sleeps on the monotonic clock, resuming after signal interruptions.
#[derive(Debug, Default)]
pub(crate) struct NanoSleepPacer;

impl Pacer for NanoSleepPacer {
    fn pace(&mut self, interval: Duration) -> nix::Result<()> {
        let start = Instant::now();
        let mut remaining = interval;
        loop {
            match clock_nanosleep(
                ClockId::CLOCK_MONOTONIC,
                ClockNanosleepFlags::empty(),
                &TimeSpec::from_duration(remaining),
            ) {
                Ok(_) => return Ok(()),
                Err(Errno::EINTR) => {
                    // Retry.
                    remaining = interval.saturating_sub(start.elapsed());
                    if remaining.is_zero() {
                        return Ok(());
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// What a transition ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteOutcome {
    /// Nothing was written.
    NoOp,
    /// The target was written; bytes of the final write.
    Written(usize),
}

/// Moves a brightness cell from one level to another.
#[derive(Debug)]
pub(crate) struct Transition<P> {
    config: FadeConfig,
    pacer: P,
}

impl<P: Pacer> Transition<P> {
    pub(crate) fn new(config: FadeConfig, pacer: P) -> Self {
        Self { config, pacer }
    }

    #[cfg(test)]
    pub(crate) fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Move `store` from `start` to `start + delta`.
    ///
    /// Intermediate values move strictly towards the target and the last
    /// write is always the target itself. On failure the cell keeps the last
    /// value that was written successfully.
    pub(crate) fn run<S: ScalarStore>(
        &mut self,
        store: &mut S,
        start: u32,
        delta: i64,
    ) -> Result<WriteOutcome, FadeError> {
        if delta == 0 {
            debug!("No change requested, not touching {}", store.path().display());
            return Ok(WriteOutcome::NoOp);
        }
        let target = i64::from(start).saturating_add(delta);
        if !(0..=PHYSICAL_CEILING).contains(&target) {
            warn!("Refusing to move to {target}, outside 0..={PHYSICAL_CEILING}");
            return Ok(WriteOutcome::NoOp);
        }

        let Some((step, interval)) = self.config.plan(delta) else {
            let bytes = store.write(target)?;
            info!("Set {} to {target}", store.path().display());
            return Ok(WriteOutcome::Written(bytes));
        };
        debug!("Fading {start} -> {target} in steps of {step}, {interval:?} apart");

        let mut current = i64::from(start);
        loop {
            current += step;
            let reached = if delta > 0 {
                current >= target
            } else {
                current <= target
            };
            if reached {
                let bytes = store.write(target)?;
                info!("Faded {} to {target}", store.path().display());
                return Ok(WriteOutcome::Written(bytes));
            }
            store.write(current)?;
            self.pacer.pace(interval).context(PaceSnafu)?;
        }
    }
}
