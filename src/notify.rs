//! Desktop notification and icon selection

use std::{
    ffi::OsString,
    fmt::Display,
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, warn};

/// Coarse brightness bucket used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IconCategory {
    Off,
    Low,
    Medium,
    High,
    Full,
}

impl IconCategory {
    /// Bucket `level` by `round(4.4 * level / max)`.
    pub(crate) fn for_level(level: u32, max: u32) -> Self {
        let bucket = (4.4 * f64::from(level) / f64::from(max.max(1))).round() as i64;
        match bucket {
            ..=0 => Self::Off,
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::Full,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Full => "full",
        }
    }

    /// Icon file for this category inside `dir`.
    pub(crate) fn icon_path(self, dir: &Path) -> PathBuf {
        dir.join(format!("notification-display-brightness-{self}.png"))
    }
}

impl Display for IconCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transient brightness notification sent through `notify-send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notification {
    pub icon: PathBuf,
    pub percent: u32,
    pub summary: String,
}

impl Notification {
    fn args(&self) -> Vec<OsString> {
        vec![
            "-t".into(),
            "500".into(),
            "-i".into(),
            self.icon.clone().into(),
            "-h".into(),
            "int:transient:1".into(),
            "-h".into(),
            format!("int:value:{}", self.percent).into(),
            "-h".into(),
            "string:synchronous:brightness".into(),
            format!("Brightness {}", self.summary).into(),
        ]
    }

    /// Send the notification. Failures are logged and otherwise ignored.
    pub(crate) fn send(&self) {
        match Command::new("notify-send").args(self.args()).status() {
            Ok(status) if status.success() => debug!("Sent notification: {}", self.summary),
            Ok(status) => warn!("notify-send exited with {status}"),
            Err(err) => warn!("Failed to run notify-send: {err}"),
        }
    }
}
