//! The control store: registration, loading and the `should_log` hot path.
//!
//! Locking discipline:
//! * mutating operations ([`ControlStore::load`], [`ControlStore::register`],
//!   [`ControlStore::open_for_update`]) take the cross-process file lock, then
//!   the in-process write lock, and release them in reverse order;
//! * [`ControlStore::should_log`] takes only the in-process read lock.
//!
//! The index is rebuilt from a full parse whenever the mapping changes, so its
//! [`ToggleRef`]s always match the current mapping generation while the read
//! lock is held.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{debug, warn};

use crate::error::{ControlError, Result};
use crate::level::Level;
use crate::lock::{CrossProcessLock, LockGuard, LockOptions};
use crate::parse::{key_present, parse_records};
use crate::paths::default_control_path;
use crate::region::{Access, MappedRegion, Sharing};
use crate::toggle::{self, DEFAULT_TOGGLES, ToggleRef, ToggleState};
use crate::update::UpdateSession;

/// Comment lines written before the first record of a new control file.
pub const HEADER: &str = "# log control file, modified by logctl\n\
	# format: <application>:<component> FATAL ERROR WARNING INFO DEBUG\n";

/// Builds the lookup key for an application and component.
pub fn key_for(application: &str, component: &str) -> String {
	format!("{application}:{component}")
}

#[derive(Debug, Clone)]
struct Record {
	application: String,
	component: String,
	toggles: ToggleRef,
}

#[derive(Debug, Default)]
struct StoreState {
	region: Option<MappedRegion>,
	index: HashMap<String, Record>,
	/// Whether `index` matches the current mapping. False after a failed parse.
	index_valid: bool,
	/// Number of full index rebuilds.
	reindexes: u64,
	/// Append handle, opened on first registration.
	appender: Option<File>,
}

impl StoreState {
	/// Maps the control file or extends the mapping, rebuilding the index
	/// when the mapping changed, the last parse failed, or `force_reindex` is set.
	fn refresh(&mut self, path: &Path, force_reindex: bool) -> Result<&MappedRegion> {
		let (region, remapped) = match self.region.take() {
			Some(mut region) => match region.extend() {
				Ok(remapped) => (region, remapped),
				Err(e) => {
					self.region = Some(region);
					return Err(e);
				}
			},
			None => (MappedRegion::map(path, Access::ReadOnly, Sharing::Shared)?, true),
		};
		let region = self.region.insert(region);
		if remapped || force_reindex || !self.index_valid {
			self.index_valid = false;
			self.reindexes += 1;
			rebuild_index(&mut self.index, region)?;
			self.index_valid = true;
		}
		Ok(region)
	}

	fn appender(&mut self, path: &Path) -> Result<&mut File> {
		let file = match self.appender.take() {
			Some(file) => file,
			None => open_appender(path)?,
		};
		Ok(self.appender.insert(file))
	}
}

fn open_appender(path: &Path) -> Result<File> {
	let mut options = OpenOptions::new();
	options.append(true).create(true);
	#[cfg(unix)]
	{
		use std::os::unix::fs::OpenOptionsExt;
		options.mode(0o600);
	}
	options.open(path).map_err(ControlError::io(path))
}

/// Replaces `index` with the records of `region`.
///
/// On a parse error the index is left empty, so lookups fall back to defaults.
fn rebuild_index(index: &mut HashMap<String, Record>, region: &MappedRegion) -> Result<()> {
	index.clear();
	let generation = region.generation();
	for span in parse_records(region.as_bytes())? {
		let key = span.key();
		index.insert(
			key,
			Record {
				application: span.application,
				component: span.component,
				toggles: ToggleRef::new(generation, span.toggle_offset),
			},
		);
	}
	debug!(path = %region.path().display(), generation, records = index.len(), "rebuilt control index");
	Ok(())
}

/// Both locks held by a mutating operation. Fields drop in declaration order,
/// so the in-process lock is released before the file lock.
struct Exclusive<'a> {
	state: RwLockWriteGuard<'a, StoreState>,
	_file: LockGuard,
}

/// Current state of one record, copied out of the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot {
	/// Application name.
	pub application: String,
	/// Component name.
	pub component: String,
	/// Toggle bits at the time of the snapshot.
	pub toggles: ToggleState,
}

/// Per-process view of one control file.
///
/// Construct once and share by reference or [`Arc`]; nothing is opened until
/// the first [`load`](Self::load) or [`register`](Self::register).
#[derive(Debug)]
pub struct ControlStore {
	path: PathBuf,
	lock: CrossProcessLock,
	lock_options: LockOptions,
	state: RwLock<StoreState>,
}

impl ControlStore {
	/// Store over the control file at `path`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self::with_lock_options(path, LockOptions::default())
	}

	/// Store over `path` whose lock waits follow `lock_options`.
	pub fn with_lock_options(path: impl Into<PathBuf>, lock_options: LockOptions) -> Self {
		let path = path.into();
		Self {
			lock: CrossProcessLock::for_control_file(&path),
			path,
			lock_options,
			state: RwLock::new(StoreState::default()),
		}
	}

	/// Store over [`default_control_path`].
	pub fn open_default() -> Self {
		Self::new(default_control_path())
	}

	/// Process-wide store over the default path, created on first use.
	///
	/// Prefer constructing a store and passing it explicitly; this exists for
	/// loggers built without one.
	pub fn global() -> Arc<ControlStore> {
		static GLOBAL: OnceLock<Arc<ControlStore>> = OnceLock::new();
		Arc::clone(GLOBAL.get_or_init(|| Arc::new(ControlStore::open_default())))
	}

	/// Control file path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn lock_exclusive(&self) -> Result<Exclusive<'_>> {
		let file = self.lock.acquire_with(&self.lock_options)?;
		Ok(Exclusive {
			state: self.state.write(),
			_file: file,
		})
	}

	/// Maps the control file (creating it if absent) and rebuilds the index.
	pub fn load(&self) -> Result<()> {
		let mut held = self.lock_exclusive()?;
		held.state.refresh(&self.path, true)?;
		Ok(())
	}

	/// Ensures `application:component` has a line in the control file.
	///
	/// The mapping is first brought up to the file's length and re-parsed
	/// only if it grew or the last parse failed, so a corrupt file fails
	/// before anything is written. Presence is decided by scanning the raw file bytes, not the
	/// index, so entries appended by other processes are never duplicated. A
	/// new line gets the default toggles (everything but DEBUG enabled).
	pub fn register(&self, application: &str, component: &str) -> Result<()> {
		validate_application(application)?;
		validate_component(component)?;
		let key = key_for(application, component);

		let mut held = self.lock_exclusive()?;
		let state = &mut *held.state;
		let region = state.refresh(&self.path, false)?;
		if key_present(region.as_bytes(), &key) {
			debug!(%key, "already registered");
			return Ok(());
		}
		let needs_header = region.is_empty();

		let mut line = Vec::with_capacity(HEADER.len() + key.len() + DEFAULT_TOGGLES.len() + 1);
		if needs_header {
			line.extend_from_slice(HEADER.as_bytes());
		}
		line.extend_from_slice(key.as_bytes());
		line.extend_from_slice(&DEFAULT_TOGGLES);
		line.push(b'\n');
		state
			.appender(&self.path)?
			.write_all(&line)
			.map_err(ControlError::io(&self.path))?;

		state.refresh(&self.path, false)?;
		if !state.index.contains_key(&key) {
			warn!(%key, "registered key missing from index after append");
		}
		debug!(%key, header = needs_header, "registered");
		Ok(())
	}

	/// Whether messages at `level` should be emitted for `key`.
	///
	/// Unknown keys use the default toggles. Never blocks on I/O or on other
	/// processes.
	pub fn should_log(&self, key: &str, level: Level) -> bool {
		let state = self.state.read();
		let toggles = match (state.index.get(key), state.region.as_ref()) {
			(Some(record), Some(region)) => match region.toggle(record.toggles) {
				Ok(toggles) => toggles,
				Err(e) => {
					warn!(key, error = %e, "using default toggles");
					&DEFAULT_TOGGLES
				}
			},
			_ => &DEFAULT_TOGGLES,
		};
		toggle::is_enabled(toggles, level)
	}

	/// Whether the index holds `key` as of the last load or registration.
	pub fn is_registered(&self, key: &str) -> bool {
		self.state.read().index.contains_key(key)
	}

	/// Generation of the current mapping, if mapped.
	pub fn generation(&self) -> Option<u64> {
		self.state.read().region.as_ref().map(MappedRegion::generation)
	}

	/// Copies out every indexed record in file order.
	pub fn records(&self) -> Vec<RecordSnapshot> {
		let state = self.state.read();
		let Some(region) = state.region.as_ref() else {
			return Vec::new();
		};
		let mut records: Vec<_> = state
			.index
			.values()
			.filter_map(|record| {
				let toggles = region.toggle(record.toggles).ok()?;
				Some((
					record.toggles.offset(),
					RecordSnapshot {
						application: record.application.clone(),
						component: record.component.clone(),
						toggles: ToggleState::from_bytes(*toggles),
					},
				))
			})
			.collect();
		records.sort_by_key(|(offset, _)| *offset);
		records.into_iter().map(|(_, record)| record).collect()
	}

	/// Opens a writable view of the control file for in-place toggle edits.
	///
	/// The locks are held only while the mapping is established.
	pub fn open_for_update(&self) -> Result<UpdateSession> {
		let _held = self.lock_exclusive()?;
		let region = MappedRegion::map(&self.path, Access::ReadWrite, Sharing::Shared)?;
		Ok(UpdateSession::new(region))
	}
}

fn validate_application(application: &str) -> Result<()> {
	let reason = if application.is_empty() {
		"must not be empty"
	} else if application.contains([':', '\n']) {
		"must not contain ':' or newline"
	} else if application.starts_with('#') {
		"must not start with '#'"
	} else {
		return Ok(());
	};
	Err(ControlError::InvalidKey {
		field: "application",
		value: application.to_string(),
		reason,
	})
}

fn validate_component(component: &str) -> Result<()> {
	let reason = if component.is_empty() {
		"must not be empty"
	} else if component.contains([' ', '\n']) {
		"must not contain space or newline"
	} else {
		return Ok(());
	};
	Err(ControlError::InvalidKey {
		field: "component",
		value: component.to_string(),
		reason,
	})
}
