//! In-place editing of toggle bits.
//!
//! An [`UpdateSession`] holds its own shared, writable mapping of the control
//! file. Edits only ever rewrite 4-byte level tokens, so record boundaries
//! never move and readers in other processes see the new bits through the
//! same physical pages.

use std::fmt;
use std::path::Path;

use crate::error::{ParseError, Result};
use crate::level::Level;
use crate::parse::parse_records;
use crate::region::MappedRegion;
use crate::store::key_for;
use crate::toggle::{self, TOGGLE_REGION_LEN, ToggleState};

/// Writable view of a control file, opened by
/// [`ControlStore::open_for_update`](crate::ControlStore::open_for_update).
#[derive(Debug)]
pub struct UpdateSession {
	region: MappedRegion,
}

impl UpdateSession {
	pub(crate) fn new(region: MappedRegion) -> Self {
		Self { region }
	}

	/// Parses the mapped file into records with writable toggle regions.
	///
	/// Records borrow disjoint slices of the mapping; drop them before
	/// calling [`flush`](Self::flush).
	pub fn parse(&mut self) -> Result<Vec<WritableRecord<'_>>> {
		let spans = parse_records(self.region.as_bytes())?;
		let mut rest: &mut [u8] = self.region.as_bytes_mut().unwrap_or_default();
		let mut consumed = 0;
		let mut records = Vec::with_capacity(spans.len());

		for span in spans {
			let skip = span.toggle_offset - consumed;
			let Some((toggles, tail)) = std::mem::take(&mut rest)
				.get_mut(skip..)
				.and_then(|tail| tail.split_first_chunk_mut::<TOGGLE_REGION_LEN>())
			else {
				return Err(ParseError::Truncated {
					line: span.line,
					text: key_for(&span.application, &span.component),
				}
				.into());
			};
			rest = tail;
			consumed = span.toggle_offset + TOGGLE_REGION_LEN;
			records.push(WritableRecord {
				application: span.application,
				component: span.component,
				line: span.line,
				toggles,
			});
		}
		Ok(records)
	}

	/// Forces edits to storage and to every other mapping.
	pub fn flush(&self) -> Result<()> {
		self.region.flush()
	}

	/// Releases the mapping.
	pub fn close(self) {
		self.region.unmap();
	}

	/// Control file path.
	pub fn path(&self) -> &Path {
		self.region.path()
	}
}

/// A record whose toggle bits can be flipped in place.
pub struct WritableRecord<'a> {
	/// Application name.
	pub application: String,
	/// Component name.
	pub component: String,
	/// 1-based line number in the control file.
	pub line: usize,
	toggles: &'a mut [u8; TOGGLE_REGION_LEN],
}

impl WritableRecord<'_> {
	/// `application:component`.
	pub fn key(&self) -> String {
		key_for(&self.application, &self.component)
	}

	/// Whether `level` is currently enabled.
	pub fn is_enabled(&self, level: Level) -> bool {
		toggle::is_enabled(self.toggles, level)
	}

	/// Writes the ON or OFF token for `level`.
	pub fn set_enabled(&mut self, level: Level, enabled: bool) {
		toggle::set_enabled(self.toggles, level, enabled);
	}

	/// Sets every level at once.
	pub fn set_all(&mut self, enabled: bool) {
		for level in Level::ALL {
			self.set_enabled(level, enabled);
		}
	}

	/// Copy of the current toggle bits.
	pub fn toggles(&self) -> ToggleState {
		ToggleState::from_bytes(*self.toggles)
	}
}

/// Formats as the control line without its newline.
impl fmt::Display for WritableRecord<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}{}", self.application, self.component, self.toggles())
	}
}

impl fmt::Debug for WritableRecord<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WritableRecord")
			.field("application", &self.application)
			.field("component", &self.component)
			.field("line", &self.line)
			.field("toggles", &self.toggles())
			.finish()
	}
}

#[cfg(test)]
mod tests;
