//! Log severity levels and their position in a toggle region.

use std::fmt;
use std::str::FromStr;

/// Severity of a log message.
///
/// Declaration order is the on-disk field order of a toggle region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
	/// Unrecoverable failure.
	Fatal,
	/// Operation failed.
	Error,
	/// Something unexpected that was handled.
	Warning,
	/// Normal operational messages.
	Info,
	/// Verbose diagnostics, off by default.
	Debug,
}

impl Level {
	/// All levels in toggle region order.
	pub const ALL: [Level; 5] = [Level::Fatal, Level::Error, Level::Warning, Level::Info, Level::Debug];

	/// Zero-based field index inside a toggle region.
	pub const fn index(self) -> usize {
		self as usize
	}

	/// Name printed by the logger front-end.
	pub const fn as_str(self) -> &'static str {
		match self {
			Level::Fatal => "FATAL",
			Level::Error => "ERROR",
			Level::Warning => "WARN",
			Level::Info => "INFO",
			Level::Debug => "DEBUG",
		}
	}
}

impl fmt::Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a string names no known level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a known log level")]
pub struct UnknownLevel(pub String);

impl FromStr for Level {
	type Err = UnknownLevel;

	/// Case-insensitive; accepts both `WARN` and `WARNING`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"FATAL" => Ok(Level::Fatal),
			"ERROR" => Ok(Level::Error),
			"WARN" | "WARNING" => Ok(Level::Warning),
			"INFO" => Ok(Level::Info),
			"DEBUG" => Ok(Level::Debug),
			_ => Err(UnknownLevel(s.to_string())),
		}
	}
}
