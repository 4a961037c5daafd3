//! Single instance lock, so two fades never interleave their writes

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use log::{debug, warn};
use nix::{
    errno::Errno,
    fcntl::{fcntl, FcntlArg},
    libc,
};
use snafu::{IntoError, ResultExt};

use crate::errors::{ContendedSnafu, DeadlockSnafu, LockError, LockFcntlSnafu, LockOpenSnafu};

pub(crate) const DEFAULT_LOCK_FILE: &str = "/tmp/brightLOCK";

/// Exclusive POSIX record lock on a well-known file, held until dropped.
#[derive(Debug)]
pub(crate) struct InstanceLock {
    file: File,
    path: PathBuf,
}

/// Whole-file lock request of the given type.
fn lock_request(kind: libc::c_int) -> libc::flock {
    // SAFETY: flock is a plain C struct for which all zeroes is valid.
    let mut request: libc::flock = unsafe { std::mem::zeroed() };
    request.l_type = kind as _;
    request.l_whence = libc::SEEK_SET as _;
    request
}

/// Classify a failed `F_SETLKW`.
fn lock_error(err: Errno, path: &Path) -> LockError {
    match err {
        Errno::EDEADLK => DeadlockSnafu { path }.build(),
        Errno::EINTR | Errno::EACCES | Errno::EAGAIN => ContendedSnafu { path }.into_error(err),
        _ => LockFcntlSnafu { path }.into_error(err),
    }
}

impl InstanceLock {
    /// Take the lock, waiting for any other holder to finish.
    pub(crate) fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .context(LockOpenSnafu { path })?;
        let request = lock_request(libc::F_WRLCK);
        fcntl(&file, FcntlArg::F_SETLKW(&request)).map_err(|err| lock_error(err, path))?;
        debug!("Locked {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let request = lock_request(libc::F_UNLCK);
        match fcntl(&self.file, FcntlArg::F_SETLK(&request)) {
            Ok(_) => debug!("Unlocked {}", self.path.display()),
            // Closing the file releases it anyway.
            Err(err) => warn!("Failed to unlock {}: {err}", self.path.display()),
        }
    }
}
