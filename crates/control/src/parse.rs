//! Control file parser.
//!
//! Each non-comment line is `<application>:<component>` followed by a
//! 20-byte toggle region that starts at the first space after the colon.

use memchr::memchr;
use memchr::memmem;

use crate::error::ParseError;
use crate::toggle::TOGGLE_REGION_LEN;

/// One parsed record.
///
/// Names are owned copies; the toggle region is only an offset into the
/// buffer that was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpan {
	/// Text before the first `:`.
	pub application: String,
	/// Text between the `:` and the toggle region.
	pub component: String,
	/// Byte offset of the toggle region in the parsed buffer.
	pub toggle_offset: usize,
	/// 1-based line number.
	pub line: usize,
}

impl RecordSpan {
	/// `application:component`.
	pub fn key(&self) -> String {
		crate::store::key_for(&self.application, &self.component)
	}
}

/// Parses every record in `buf`, skipping `#` comment lines.
///
/// The first malformed line fails the whole parse.
pub fn parse_records(buf: &[u8]) -> Result<Vec<RecordSpan>, ParseError> {
	let mut records = Vec::new();
	let mut offset = 0;
	let mut line_no = 0;
	while offset < buf.len() {
		line_no += 1;
		let end = memchr(b'\n', &buf[offset..]).map_or(buf.len(), |i| offset + i);
		let line = &buf[offset..end];
		if line.first() != Some(&b'#') {
			records.push(parse_line(line, offset, line_no)?);
		}
		offset = end + 1;
	}
	Ok(records)
}

fn parse_line(line: &[u8], line_start: usize, line_no: usize) -> Result<RecordSpan, ParseError> {
	let text = || String::from_utf8_lossy(line).into_owned();

	let colon = memchr(b':', line).ok_or_else(|| ParseError::MissingColon { line: line_no, text: text() })?;
	let after_colon = &line[colon + 1..];
	if after_colon.is_empty() {
		return Err(ParseError::Truncated { line: line_no, text: text() });
	}
	let space = memchr(b' ', after_colon).ok_or_else(|| ParseError::MissingSpace { line: line_no, text: text() })?;
	let toggle_start = colon + 1 + space;
	if line.len() - toggle_start < TOGGLE_REGION_LEN {
		return Err(ParseError::Truncated { line: line_no, text: text() });
	}

	Ok(RecordSpan {
		application: String::from_utf8_lossy(&line[..colon]).into_owned(),
		component: String::from_utf8_lossy(&after_colon[..space]).into_owned(),
		toggle_offset: line_start + toggle_start,
		line: line_no,
	})
}

/// Whether a record line for `key` occurs in `buf`.
///
/// Matches `"\n" + key + " "`, so only records after the first line are
/// found; files written by registration always start with a comment header.
pub fn key_present(buf: &[u8], key: &str) -> bool {
	let mut needle = Vec::with_capacity(key.len() + 2);
	needle.push(b'\n');
	needle.extend_from_slice(key.as_bytes());
	needle.push(b' ');
	memmem::find(buf, &needle).is_some()
}

#[cfg(test)]
mod tests;
