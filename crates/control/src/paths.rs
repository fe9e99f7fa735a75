//! Control file path resolution.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable selecting the control file path.
pub const CONTROL_PATH_ENV: &str = "LOG_CONTROL_PATH";

/// File name used inside the runtime directory.
const CONTROL_FILE_NAME: &str = "logcontrol";

/// Returns the default control file path.
///
/// # Resolution Order
///
/// 1. `LOG_CONTROL_PATH` environment variable.
/// 2. System runtime directory (e.g., `$XDG_RUNTIME_DIR`), if it can be created.
/// 3. `/var/run` on unix, the system temp directory elsewhere.
///
/// The default file name is `logcontrol`.
#[must_use]
pub fn default_control_path() -> PathBuf {
	if let Some(p) = std::env::var_os(CONTROL_PATH_ENV).filter(|p| !p.is_empty()) {
		return PathBuf::from(p);
	}

	dirs::runtime_dir()
		.filter(|p| std::fs::create_dir_all(p).is_ok())
		.unwrap_or_else(fallback_dir)
		.join(CONTROL_FILE_NAME)
}

#[cfg(unix)]
fn fallback_dir() -> PathBuf {
	PathBuf::from("/var/run")
}

#[cfg(not(unix))]
fn fallback_dir() -> PathBuf {
	std::env::temp_dir()
}

/// Returns the advisory lock path paired with a control file: `<path>.lock`.
#[must_use]
pub fn lock_path_for(control_path: &Path) -> PathBuf {
	let mut name = OsString::from(control_path.as_os_str());
	name.push(".lock");
	PathBuf::from(name)
}
