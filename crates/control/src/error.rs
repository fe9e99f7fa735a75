//! Error types for control file operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by loading, registration and update sessions.
#[derive(Debug, Error)]
pub enum ControlError {
	/// Opening, stat-ing or appending to the control file failed.
	#[error("I/O error on {path}: {source}")]
	Io {
		/// Path of the file involved.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// Mapping, remapping or syncing the control file failed.
	#[error("failed to map {path}: {source}")]
	Map {
		/// Path of the mapped file.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The advisory lock could not be acquired.
	#[error(transparent)]
	Lock(#[from] LockError),

	/// The control file contains a malformed line.
	#[error("parse control file: {0}")]
	Parse(#[from] ParseError),

	/// An application or component name cannot be encoded in a control line.
	#[error("invalid {field} {value:?}: {reason}")]
	InvalidKey {
		/// Which half of the key was rejected (`application` or `component`).
		field: &'static str,
		/// The rejected value.
		value: String,
		/// Why it was rejected.
		reason: &'static str,
	},

	/// A toggle reference outlived the mapping it was taken from.
	#[error("stale toggle reference: taken at generation {taken}, region is at {current}")]
	StaleReference {
		/// Generation the reference was created in.
		taken: u64,
		/// Current generation of the region.
		current: u64,
	},
}

/// Errors acquiring the cross-process lock.
#[derive(Debug, Error)]
pub enum LockError {
	/// The lock file could not be opened or created.
	#[error("open lock file {path}: {source}")]
	Open {
		/// Lock file path.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The `flock` call itself failed.
	#[error("lock {path}: {source}")]
	Acquire {
		/// Lock file path.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The configured deadline passed while another holder kept the lock.
	#[error("timed out waiting for lock {path}")]
	Timeout {
		/// Lock file path.
		path: PathBuf,
	},

	/// Acquisition was cancelled through its token.
	#[error("cancelled while waiting for lock {path}")]
	Cancelled {
		/// Lock file path.
		path: PathBuf,
	},
}

/// A malformed control file line.
///
/// Line numbers are 1-based and count comment lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	/// No `:` separating application and component.
	#[error("line {line}: no application end mark found: {text:?}")]
	MissingColon {
		/// Line number.
		line: usize,
		/// Offending line.
		text: String,
	},

	/// No space terminating the component.
	#[error("line {line}: no component end mark found: {text:?}")]
	MissingSpace {
		/// Line number.
		line: usize,
		/// Offending line.
		text: String,
	},

	/// The line ends before a full component and toggle region.
	#[error("line {line}: full level toggle string not found: {text:?}")]
	Truncated {
		/// Line number.
		line: usize,
		/// Offending line.
		text: String,
	},
}

impl ControlError {
	pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
		let path = path.into();
		move |source| Self::Io { path, source }
	}

	pub(crate) fn map(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
		let path = path.into();
		move |source| Self::Map { path, source }
	}
}

/// Result type for control file operations.
pub type Result<T> = std::result::Result<T, ControlError>;
