//! Integer cells kept as decimal text in a file

use std::{
    fs::{File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use log::debug;
use snafu::ResultExt;

use crate::errors::{IoSnafu, StoreError, UnavailableSnafu};

/// A single addressable integer.
pub(crate) trait ScalarStore {
    /// Location of the cell, used in diagnostics.
    fn path(&self) -> &Path;

    /// Read the leading integer on the first line.
    fn read(&self) -> Result<i64, StoreError>;

    /// Replace the value. Returns the number of bytes written, which is only
    /// meaningful as a success marker.
    fn write(&mut self, value: i64) -> Result<usize, StoreError>;
}

/// A cell backed by a file such as `/sys/class/backlight/*/brightness`.
#[derive(Debug, Clone)]
pub(crate) struct FileCell {
    path: PathBuf,
}

impl FileCell {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Check whether the cell can be opened for writing, without writing.
    pub fn is_writable(&self) -> bool {
        match OpenOptions::new().write(true).open(&self.path) {
            Ok(_) => true,
            Err(err) => {
                debug!("{} is not writable: {err}", self.path.display());
                false
            }
        }
    }
}

impl ScalarStore for FileCell {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<i64, StoreError> {
        let f = File::open(&self.path).context(UnavailableSnafu {
            path: &self.path,
            mode: "reading",
        })?;
        let mut line = String::new();
        BufReader::new(f)
            .read_line(&mut line)
            .context(IoSnafu { path: &self.path })?;
        Ok(parse_leading_int(&line))
    }

    fn write(&mut self, value: i64) -> Result<usize, StoreError> {
        // Unbuffered on purpose: every value must reach the kernel before the
        // caller starts pacing.
        let mut f = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .context(UnavailableSnafu {
                path: &self.path,
                mode: "writing",
            })?;
        let text = format!("{value}\n");
        f.write_all(text.as_bytes())
            .and_then(|()| f.flush())
            .context(IoSnafu { path: &self.path })?;
        Ok(text.len())
    }
}

/// Parse like C `atoi`: skip leading whitespace, accept an optional sign and
/// stop at the first non-digit. No digits yields 0.
pub(crate) fn parse_leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::{Path, PathBuf};

    use snafu::IntoError;

    use super::ScalarStore;
    use crate::errors::{StoreError, UnavailableSnafu};

    /// Fresh scratch directory for one test.
    pub(crate) fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("backlightctl-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// In-memory cell recording every write.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryCell {
        pub value: Option<i64>,
        pub writes: Vec<i64>,
        /// Number of writes that succeed before every further write fails.
        pub fail_after: Option<usize>,
        pub path: PathBuf,
    }

    impl MemoryCell {
        pub(crate) fn with_value(value: i64) -> Self {
            Self {
                value: Some(value),
                ..Self::default()
            }
        }
    }

    impl ScalarStore for MemoryCell {
        fn path(&self) -> &Path {
            &self.path
        }

        fn read(&self) -> Result<i64, StoreError> {
            self.value.ok_or_else(|| {
                UnavailableSnafu {
                    path: &self.path,
                    mode: "reading",
                }
                .into_error(std::io::ErrorKind::NotFound.into())
            })
        }

        fn write(&mut self, value: i64) -> Result<usize, StoreError> {
            if self.fail_after.is_some_and(|n| self.writes.len() >= n) {
                return Err(UnavailableSnafu {
                    path: &self.path,
                    mode: "writing",
                }
                .into_error(std::io::ErrorKind::PermissionDenied.into()));
            }
            self.writes.push(value);
            self.value = Some(value);
            Ok(format!("{value}\n").len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::scratch_dir;
    use super::*;

    #[test]
    fn parses_leading_integer() {
        assert_eq!(parse_leading_int("852\n"), 852);
        assert_eq!(parse_leading_int("  42 trailing"), 42);
        assert_eq!(parse_leading_int("-7"), -7);
        assert_eq!(parse_leading_int("+13x"), 13);
        assert_eq!(parse_leading_int("garbage"), 0);
        assert_eq!(parse_leading_int(""), 0);
        assert_eq!(parse_leading_int("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn file_cell_write_then_read() {
        let dir = scratch_dir("file-cell");
        let mut cell = FileCell::new(dir.join("brightness"));
        assert_eq!(cell.write(300).unwrap(), 4);
        assert_eq!(std::fs::read_to_string(cell.path()).unwrap(), "300\n");
        assert_eq!(cell.read().unwrap(), 300);

        // Truncates longer previous content.
        cell.write(5).unwrap();
        assert_eq!(std::fs::read_to_string(cell.path()).unwrap(), "5\n");
        assert!(cell.is_writable());
    }

    #[test]
    fn file_cell_reads_first_line_only() {
        let dir = scratch_dir("first-line");
        std::fs::write(dir.join("max"), "120\n7\n").unwrap();
        assert_eq!(FileCell::new(dir.join("max")).read().unwrap(), 120);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = scratch_dir("missing");
        let cell = FileCell::new(dir.join("nope"));
        assert!(matches!(cell.read(), Err(StoreError::Unavailable { .. })));
        assert!(!cell.is_writable());

        let mut cell = FileCell::new(dir.join("no-such-dir").join("cell"));
        assert!(matches!(cell.write(1), Err(StoreError::Unavailable { .. })));
    }
}
