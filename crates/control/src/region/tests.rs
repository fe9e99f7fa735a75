use std::fs;
use std::io::Write;

use super::*;

fn append(path: &Path, bytes: &[u8]) {
	let mut f = OpenOptions::new().append(true).open(path).expect("open for append");
	f.write_all(bytes).expect("append");
}

#[test]
fn mapping_missing_file_creates_it_empty() {
	let dir = tempfile::tempdir().expect("create tempdir");
	let path = dir.path().join("control");

	let region = MappedRegion::map(&path, Access::ReadOnly, Sharing::Shared).expect("map");
	assert!(path.exists());
	assert!(region.is_empty());
	assert_eq!(region.as_bytes(), b"");
	assert_eq!(region.generation(), 1);
}

#[cfg(unix)]
#[test]
fn created_file_is_owner_only() {
	use std::os::unix::fs::PermissionsExt;

	let dir = tempfile::tempdir().expect("create tempdir");
	let path = dir.path().join("control");
	MappedRegion::map(&path, Access::ReadWrite, Sharing::Shared).expect("map");
	let mode = fs::metadata(&path).expect("stat").permissions().mode();
	assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn extend_picks_up_appended_bytes() {
	let dir = tempfile::tempdir().expect("create tempdir");
	let path = dir.path().join("control");
	let mut region = MappedRegion::map(&path, Access::ReadOnly, Sharing::Shared).expect("map");

	append(&path, b"hello\n");
	assert!(region.is_empty(), "mapping does not grow on its own");
	assert!(region.extend().expect("extend"));
	assert_eq!(region.as_bytes(), b"hello\n");
	assert_eq!(region.generation(), 2);

	append(&path, b"world\n");
	assert!(region.extend().expect("extend"));
	assert_eq!(region.as_bytes(), b"hello\nworld\n");
	assert_eq!(region.generation(), 3);
}

#[test]
fn extend_without_growth_keeps_generation() {
	let dir = tempfile::tempdir().expect("create tempdir");
	let path = dir.path().join("control");
	fs::write(&path, b"abc").expect("seed");

	let mut region = MappedRegion::map(&path, Access::ReadOnly, Sharing::Shared).expect("map");
	assert!(!region.extend().expect("extend"));
	assert_eq!(region.generation(), 1);
}

#[test]
fn toggle_refs_go_stale_after_remap() {
	let dir = tempfile::tempdir().expect("create tempdir");
	let path = dir.path().join("control");
	fs::write(&path, b"a:b  ON  ON  ON  ON OFF\n").expect("seed");

	let mut region = MappedRegion::map(&path, Access::ReadOnly, Sharing::Shared).expect("map");
	let r = ToggleRef::new(region.generation(), 3);
	assert_eq!(region.toggle(r).expect("fresh ref"), b"  ON  ON  ON  ON OFF");

	append(&path, b"c:d  ON  ON  ON  ON OFF\n");
	region.extend().expect("extend");
	assert!(matches!(
		region.toggle(r),
		Err(ControlError::StaleReference { taken: 1, current: 2 })
	));
}

#[test]
fn out_of_range_ref_is_rejected() {
	let dir = tempfile::tempdir().expect("create tempdir");
	let path = dir.path().join("control");
	fs::write(&path, b"short").expect("seed");

	let region = MappedRegion::map(&path, Access::ReadOnly, Sharing::Shared).expect("map");
	assert!(region.toggle(ToggleRef::new(region.generation(), 0)).is_err());
}

#[test]
fn shared_writes_are_visible_to_other_mappings() {
	let dir = tempfile::tempdir().expect("create tempdir");
	let path = dir.path().join("control");
	fs::write(&path, b" OFF").expect("seed");

	let reader = MappedRegion::map(&path, Access::ReadOnly, Sharing::Shared).expect("map reader");
	let mut writer = MappedRegion::map(&path, Access::ReadWrite, Sharing::Shared).expect("map writer");
	writer.as_bytes_mut().expect("writable").copy_from_slice(b"  ON");
	writer.flush().expect("flush");

	assert_eq!(reader.as_bytes(), b"  ON");
	assert_eq!(fs::read(&path).expect("read"), b"  ON");
}

#[test]
fn private_writes_stay_local() {
	let dir = tempfile::tempdir().expect("create tempdir");
	let path = dir.path().join("control");
	fs::write(&path, b" OFF").expect("seed");

	let mut region = MappedRegion::map(&path, Access::ReadWrite, Sharing::Private).expect("map");
	region.as_bytes_mut().expect("writable").copy_from_slice(b"  ON");
	region.flush().expect("flush");

	assert_eq!(region.as_bytes(), b"  ON");
	assert_eq!(fs::read(&path).expect("read"), b" OFF");
}

#[test]
fn read_only_region_has_no_mutable_view() {
	let dir = tempfile::tempdir().expect("create tempdir");
	let path = dir.path().join("control");
	fs::write(&path, b"x").expect("seed");

	let mut region = MappedRegion::map(&path, Access::ReadOnly, Sharing::Shared).expect("map");
	assert!(region.as_bytes_mut().is_none());
	region.flush().expect("flush is a no-op");
	region.unmap();
}
