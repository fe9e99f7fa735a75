//! Toggle region codec.
//!
//! A toggle region is five right-justified 4-byte tokens, one per [`Level`]
//! in [`Level::ALL`] order. Only `"  ON"` decodes as enabled.

use std::fmt;

use crate::level::Level;

/// Width of one level token.
pub const FIELD_LEN: usize = 4;

/// Width of a full toggle region.
pub const TOGGLE_REGION_LEN: usize = FIELD_LEN * Level::ALL.len();

/// Token for an enabled level.
pub const ON: [u8; FIELD_LEN] = *b"  ON";

/// Token for a disabled level.
pub const OFF: [u8; FIELD_LEN] = *b" OFF";

/// Region written for new registrations and used for unknown keys:
/// everything but DEBUG enabled.
pub const DEFAULT_TOGGLES: [u8; TOGGLE_REGION_LEN] = *b"  ON  ON  ON  ON OFF";

/// Decodes one level from a toggle region.
#[inline]
pub fn is_enabled(region: &[u8; TOGGLE_REGION_LEN], level: Level) -> bool {
	let start = level.index() * FIELD_LEN;
	region[start..start + FIELD_LEN] == ON
}

/// Overwrites one level token in place.
#[inline]
pub fn set_enabled(region: &mut [u8; TOGGLE_REGION_LEN], level: Level, enabled: bool) {
	let start = level.index() * FIELD_LEN;
	region[start..start + FIELD_LEN].copy_from_slice(if enabled { &ON } else { &OFF });
}

/// Location of a toggle region inside a specific mapping generation.
///
/// Only meaningful for the [`MappedRegion`](crate::MappedRegion) generation it
/// was taken from; dereferencing checks the generation first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleRef {
	generation: u64,
	offset: usize,
}

impl ToggleRef {
	pub(crate) const fn new(generation: u64, offset: usize) -> Self {
		Self { generation, offset }
	}

	/// Mapping generation this reference belongs to.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Byte offset of the region in the control file.
	pub const fn offset(&self) -> usize {
		self.offset
	}
}

/// Owned copy of a toggle region.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ToggleState([u8; TOGGLE_REGION_LEN]);

impl ToggleState {
	/// Wraps raw region bytes.
	pub const fn from_bytes(bytes: [u8; TOGGLE_REGION_LEN]) -> Self {
		Self(bytes)
	}

	/// Whether `level` is enabled.
	pub fn is_enabled(&self, level: Level) -> bool {
		is_enabled(&self.0, level)
	}

	/// Raw region bytes.
	pub const fn as_bytes(&self) -> &[u8; TOGGLE_REGION_LEN] {
		&self.0
	}
}

impl Default for ToggleState {
	fn default() -> Self {
		Self(DEFAULT_TOGGLES)
	}
}

impl fmt::Display for ToggleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&String::from_utf8_lossy(&self.0))
	}
}

impl fmt::Debug for ToggleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ToggleState({:?})", String::from_utf8_lossy(&self.0))
	}
}
