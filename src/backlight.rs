//! Abstraction for a backlight in /sys

use std::path::{Path, PathBuf};

use crate::{
    errors::{DeviceError, InvalidMaxSnafu, OutOfRangeSnafu},
    state::BrightnessState,
    store::{FileCell, ScalarStore},
};

pub(crate) const DEFAULT_DEVICE: &str = "/sys/class/backlight/intel_backlight";

const BRIGHTNESS: &str = "brightness";
const MAX_BRIGHTNESS: &str = "max_brightness";

#[derive(Debug)]
pub(crate) struct Backlight {
    /// Path to backlight directory
    path: PathBuf,
}

impl Backlight {
    /// Create a new backlight wrapper.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cell holding the current brightness
    pub fn brightness_cell(&self) -> FileCell {
        FileCell::new(self.path.join(BRIGHTNESS))
    }

    /// Cell holding the max brightness supported
    fn max_brightness_cell(&self) -> FileCell {
        FileCell::new(self.path.join(MAX_BRIGHTNESS))
    }

    /// Whether we are allowed to change the brightness.
    pub fn is_writable(&self) -> bool {
        self.brightness_cell().is_writable()
    }

    /// Read and sanity check current and max brightness.
    pub fn read_state(&self) -> Result<BrightnessState, DeviceError> {
        let max = self.max_brightness_cell().read()?;
        let max = match u32::try_from(max) {
            Ok(max) if max > 0 => max,
            _ => return InvalidMaxSnafu { max }.fail(),
        };
        let current = self.brightness_cell().read()?;
        match u32::try_from(current) {
            Ok(current) if current <= max => Ok(BrightnessState::new(current, max)),
            _ => OutOfRangeSnafu { current, max }.fail(),
        }
    }
}
