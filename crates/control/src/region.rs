//! Generation-tracked memory mapping of a growing file.
//!
//! The mapping always covers the whole file as of the last [`MappedRegion::extend`].
//! Each remap bumps the generation; any [`ToggleRef`] from an older generation
//! is rejected instead of dereferenced.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapMut, MmapOptions};
use tracing::{debug, trace};

use crate::error::{ControlError, Result};
use crate::toggle::{TOGGLE_REGION_LEN, ToggleRef};

/// Protection of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
	/// Read-only pages.
	ReadOnly,
	/// Readable and writable pages.
	ReadWrite,
}

/// Visibility of writes through a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
	/// Writes reach the file and every other mapping of it.
	Shared,
	/// Copy-on-write; writes stay in this process.
	Private,
}

enum Mapping {
	/// Zero-length file, nothing mapped.
	Empty,
	ReadOnly(Mmap),
	Writable(MmapMut),
}

/// A file and a mapping over its full current length.
pub struct MappedRegion {
	path: PathBuf,
	file: File,
	access: Access,
	sharing: Sharing,
	mapping: Mapping,
	generation: u64,
}

impl MappedRegion {
	/// Opens or creates `path` and maps its current contents.
	///
	/// An empty file yields an empty region with no pages behind it.
	pub fn map(path: impl AsRef<Path>, access: Access, sharing: Sharing) -> Result<Self> {
		let path = path.as_ref().to_path_buf();
		let file = open_file(&path, access).map_err(ControlError::io(&path))?;
		let mut region = Self {
			path,
			file,
			access,
			sharing,
			mapping: Mapping::Empty,
			generation: 0,
		};
		region.remap()?;
		Ok(region)
	}

	/// Remaps to the file's current length if it changed since the last map.
	///
	/// Returns `true` when a remap happened, in which case the generation was
	/// bumped and every previously derived [`ToggleRef`] is stale. On error
	/// the previous mapping stays in place untouched.
	pub fn extend(&mut self) -> Result<bool> {
		let len = self.file_len()?;
		if len == self.len() {
			trace!(path = %self.path.display(), len, "control file unchanged");
			return Ok(false);
		}
		self.remap()?;
		Ok(true)
	}

	fn remap(&mut self) -> Result<()> {
		let len = self.file_len()?;
		let mapping = if len == 0 { Mapping::Empty } else { self.map_len(len)? };
		self.mapping = mapping;
		self.generation += 1;
		debug!(path = %self.path.display(), len, generation = self.generation, "mapped control file");
		Ok(())
	}

	fn file_len(&self) -> Result<usize> {
		let meta = self.file.metadata().map_err(ControlError::io(&self.path))?;
		usize::try_from(meta.len()).map_err(|_| ControlError::Map {
			path: self.path.clone(),
			source: io::Error::new(io::ErrorKind::FileTooLarge, "control file exceeds address space"),
		})
	}

	fn map_len(&self, len: usize) -> Result<Mapping> {
		let mut options = MmapOptions::new();
		options.len(len);
		// SAFETY: the control file is append-only and existing bytes only change
		// through 4-byte token writes, which readers treat as plain bytes.
		let mapping = unsafe {
			match (self.access, self.sharing) {
				(Access::ReadOnly, Sharing::Shared) => options.map(&self.file).map(Mapping::ReadOnly),
				(Access::ReadOnly, Sharing::Private) => options.map_copy_read_only(&self.file).map(Mapping::ReadOnly),
				(Access::ReadWrite, Sharing::Shared) => options.map_mut(&self.file).map(Mapping::Writable),
				(Access::ReadWrite, Sharing::Private) => options.map_copy(&self.file).map(Mapping::Writable),
			}
		};
		mapping.map_err(ControlError::map(&self.path))
	}

	/// Synchronously writes dirty pages back so other mappings observe them.
	///
	/// No-op for read-only or empty regions.
	pub fn flush(&self) -> Result<()> {
		match &self.mapping {
			Mapping::Writable(m) => m.flush().map_err(ControlError::map(&self.path)),
			Mapping::Empty | Mapping::ReadOnly(_) => Ok(()),
		}
	}

	/// Releases the mapping and the file handle.
	pub fn unmap(self) {
		debug!(path = %self.path.display(), generation = self.generation, "unmapped control file");
	}

	/// The mapped bytes.
	pub fn as_bytes(&self) -> &[u8] {
		match &self.mapping {
			Mapping::Empty => &[],
			Mapping::ReadOnly(m) => &m[..],
			Mapping::Writable(m) => &m[..],
		}
	}

	/// The mapped bytes, if the mapping is writable.
	pub fn as_bytes_mut(&mut self) -> Option<&mut [u8]> {
		match &mut self.mapping {
			Mapping::Writable(m) => Some(&mut m[..]),
			Mapping::Empty if self.access == Access::ReadWrite => Some(&mut []),
			Mapping::Empty | Mapping::ReadOnly(_) => None,
		}
	}

	/// Resolves a toggle reference against the current mapping.
	pub fn toggle(&self, r: ToggleRef) -> Result<&[u8; TOGGLE_REGION_LEN]> {
		let stale = || ControlError::StaleReference {
			taken: r.generation(),
			current: self.generation,
		};
		if r.generation() != self.generation {
			return Err(stale());
		}
		self.as_bytes()
			.get(r.offset()..r.offset() + TOGGLE_REGION_LEN)
			.and_then(|s| s.try_into().ok())
			.ok_or_else(stale)
	}

	/// Mapped length in bytes.
	pub fn len(&self) -> usize {
		self.as_bytes().len()
	}

	/// Whether nothing is mapped.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Number of (re)maps performed so far.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Mapped file path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Mapping protection.
	pub const fn access(&self) -> Access {
		self.access
	}
}

impl std::fmt::Debug for MappedRegion {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MappedRegion")
			.field("path", &self.path)
			.field("access", &self.access)
			.field("sharing", &self.sharing)
			.field("len", &self.len())
			.field("generation", &self.generation)
			.finish()
	}
}

/// Opens `path`, creating it empty when missing.
///
/// Read-only callers never need write permission on an existing file.
fn open_file(path: &Path, access: Access) -> io::Result<File> {
	match access {
		Access::ReadWrite => create_options().read(true).write(true).open(path),
		Access::ReadOnly => match File::open(path) {
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				drop(create_options().append(true).open(path)?);
				File::open(path)
			}
			result => result,
		},
	}
}

fn create_options() -> OpenOptions {
	let mut options = OpenOptions::new();
	options.create(true);
	#[cfg(unix)]
	{
		use std::os::unix::fs::OpenOptionsExt;
		options.mode(0o600);
	}
	options
}

#[cfg(test)]
mod tests;
