//! Remembers the brightness to come back to after toggling off

use log::debug;

use crate::{errors::StoreError, store::ScalarStore};

/// File name of the memory cell, next to the executable by default.
pub(crate) const STATE_FILE_NAME: &str = "prev_brightness";

/// Level used when toggling on without a usable saved value.
pub(crate) const DEFAULT_ON_LEVEL: u32 = 1;

#[derive(Debug)]
pub(crate) struct ToggleMemory<S> {
    cell: S,
}

impl<S: ScalarStore> ToggleMemory<S> {
    pub(crate) fn new(cell: S) -> Self {
        Self { cell }
    }

    /// Remember `level`, overwriting whatever was saved before.
    pub(crate) fn save(&mut self, level: u32) -> Result<(), StoreError> {
        self.cell.write(level.into())?;
        debug!("Saved {level} to {}", self.cell.path().display());
        Ok(())
    }

    /// The saved value, `None` if nothing could be read.
    pub(crate) fn restore(&self) -> Option<i64> {
        match self.cell.read() {
            Ok(level) => Some(level),
            Err(err) => {
                debug!("No saved brightness: {err}");
                None
            }
        }
    }

    /// The level to toggle on to. Never zero.
    pub(crate) fn restore_or_default(&self) -> u32 {
        self.restore()
            .filter(|level| *level > 0)
            .map(|level| u32::try_from(level).unwrap_or(u32::MAX))
            .unwrap_or(DEFAULT_ON_LEVEL)
    }
}
