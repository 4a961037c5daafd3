//! Brightness as reported by the device

/// Snapshot of the backlight taken at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BrightnessState {
    /// Current brightness, `0..=max`
    pub current: u32,
    /// Hardware maximum, always positive
    pub max: u32,
}

impl BrightnessState {
    pub(crate) fn new(current: u32, max: u32) -> Self {
        Self { current, max }
    }

    /// Convert a native level to a percentage of `max`, rounded to nearest.
    pub(crate) fn percent_of(&self, level: u32) -> u32 {
        (f64::from(level) * 100.0 / f64::from(self.max)).round() as u32
    }

    /// Convert a percentage of `max` to native units, rounded to nearest.
    pub(crate) fn from_percent(&self, percent: u32) -> u32 {
        (f64::from(percent) * f64::from(self.max) / 100.0).round() as u32
    }
}
