//! Advisory cross-process lock on `<control-path>.lock`.
//!
//! The lock is an exclusive `flock` on a dedicated file, so it serializes
//! every process on the host that points at the same control path, and every
//! store instance within one process (each guard holds its own open file).
//! Acquisition blocks indefinitely by default; [`LockOptions`] adds an
//! optional deadline and cancellation.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::LockError;
use crate::paths::lock_path_for;

const INITIAL_BACKOFF: Duration = Duration::from_millis(1);
const MAX_BACKOFF: Duration = Duration::from_millis(50);

/// How long and how interruptibly to wait for the lock.
#[derive(Debug, Clone, Default)]
pub struct LockOptions {
	/// Give up after this long. `None` waits forever.
	pub timeout: Option<Duration>,
	/// Abort the wait once this token is cancelled.
	pub cancel: Option<CancellationToken>,
}

impl LockOptions {
	/// Waits at most `timeout`.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Aborts the wait when `token` is cancelled.
	pub fn with_cancel(mut self, token: CancellationToken) -> Self {
		self.cancel = Some(token);
		self
	}

	fn is_unbounded(&self) -> bool {
		self.timeout.is_none() && self.cancel.is_none()
	}
}

/// File-backed exclusive lock shared by all processes using one control file.
#[derive(Debug, Clone)]
pub struct CrossProcessLock {
	path: PathBuf,
}

impl CrossProcessLock {
	/// Lock paired with the control file at `control_path`.
	pub fn for_control_file(control_path: &Path) -> Self {
		Self::new(lock_path_for(control_path))
	}

	/// Lock on an explicit lock file path.
	pub fn new(lock_path: impl Into<PathBuf>) -> Self {
		Self { path: lock_path.into() }
	}

	/// Lock file path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Blocks until the lock is held.
	pub fn acquire(&self) -> Result<LockGuard, LockError> {
		self.acquire_with(&LockOptions::default())
	}

	/// Acquires the lock, honoring the deadline and cancellation in `options`.
	pub fn acquire_with(&self, options: &LockOptions) -> Result<LockGuard, LockError> {
		let file = self.open()?;

		if options.is_unbounded() {
			file.lock_exclusive().map_err(|source| LockError::Acquire {
				path: self.path.clone(),
				source,
			})?;
			return Ok(self.guard(file));
		}

		let deadline = options.timeout.map(|t| Instant::now() + t);
		let mut backoff = INITIAL_BACKOFF;
		loop {
			match file.try_lock_exclusive() {
				Ok(()) => return Ok(self.guard(file)),
				Err(e) if is_contended(&e) => {}
				Err(source) => {
					return Err(LockError::Acquire {
						path: self.path.clone(),
						source,
					});
				}
			}

			if options.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
				return Err(LockError::Cancelled { path: self.path.clone() });
			}
			let mut sleep = backoff;
			if let Some(deadline) = deadline {
				let remaining = deadline.saturating_duration_since(Instant::now());
				if remaining.is_zero() {
					return Err(LockError::Timeout { path: self.path.clone() });
				}
				sleep = sleep.min(remaining);
			}
			trace!(path = %self.path.display(), ?sleep, "lock contended");
			std::thread::sleep(sleep);
			backoff = (backoff * 2).min(MAX_BACKOFF);
		}
	}

	fn open(&self) -> Result<File, LockError> {
		let mut options = OpenOptions::new();
		options.create(true).truncate(false).write(true);
		#[cfg(unix)]
		{
			use std::os::unix::fs::OpenOptionsExt;
			options.mode(0o600);
		}
		options.open(&self.path).map_err(|source| LockError::Open {
			path: self.path.clone(),
			source,
		})
	}

	fn guard(&self, file: File) -> LockGuard {
		debug!(path = %self.path.display(), "acquired control lock");
		LockGuard {
			file,
			path: self.path.clone(),
		}
	}
}

fn is_contended(e: &io::Error) -> bool {
	e.kind() == io::ErrorKind::WouldBlock || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Holds the cross-process lock until dropped.
#[derive(Debug)]
pub struct LockGuard {
	file: File,
	path: PathBuf,
}

impl Drop for LockGuard {
	fn drop(&mut self) {
		let _ = fs2::FileExt::unlock(&self.file);
		debug!(path = %self.path.display(), "released control lock");
	}
}
