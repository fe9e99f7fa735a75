use std::fs;

use pretty_assertions::assert_eq;

use crate::ControlStore;
use crate::level::Level;

fn store_with(components: &[&str]) -> (tempfile::TempDir, ControlStore) {
	let dir = tempfile::tempdir().expect("create tempdir");
	let store = ControlStore::new(dir.path().join("control"));
	for component in components {
		store.register("app", component).expect("register");
	}
	(dir, store)
}

#[test]
fn parse_yields_every_record_in_file_order() {
	let (_dir, store) = store_with(&["a", "b/c", "d"]);
	let mut session = store.open_for_update().expect("open");
	let records = session.parse().expect("parse");

	let keys: Vec<_> = records.iter().map(|r| r.key()).collect();
	assert_eq!(keys, vec!["app:a", "app:b/c", "app:d"]);
	assert_eq!(records[0].line, 3, "two header lines precede the first record");
	assert_eq!(records[1].to_string(), "app:b/c  ON  ON  ON  ON OFF");
}

#[test]
fn set_enabled_rewrites_only_toggle_bytes() {
	let (_dir, store) = store_with(&["a", "b"]);
	let before = fs::read(store.path()).expect("read");

	let mut session = store.open_for_update().expect("open");
	{
		let mut records = session.parse().expect("parse");
		records[1].set_enabled(Level::Debug, true);
		records[1].set_enabled(Level::Fatal, false);
		assert!(records[1].is_enabled(Level::Debug));
		assert!(!records[1].is_enabled(Level::Fatal));
	}
	session.flush().expect("flush");
	session.close();

	let after = fs::read(store.path()).expect("read");
	assert_eq!(after.len(), before.len());
	let text = String::from_utf8(after).expect("utf8");
	assert!(text.ends_with("app:a  ON  ON  ON  ON OFF\napp:b OFF  ON  ON  ON  ON\n"), "{text}");
}

#[test]
fn set_all_flips_every_level() {
	let (_dir, store) = store_with(&["a"]);
	let mut session = store.open_for_update().expect("open");
	let mut records = session.parse().expect("parse");

	records[0].set_all(false);
	assert_eq!(records[0].toggles().as_bytes(), b" OFF OFF OFF OFF OFF");
	records[0].set_all(true);
	assert_eq!(records[0].toggles().as_bytes(), b"  ON  ON  ON  ON  ON");
}

#[test]
fn loaded_store_sees_flip_without_reload() {
	let (_dir, store) = store_with(&["a"]);
	assert!(!store.should_log("app:a", Level::Debug));

	let mut session = store.open_for_update().expect("open");
	session.parse().expect("parse")[0].set_enabled(Level::Debug, true);
	session.flush().expect("flush");
	session.close();

	assert!(store.should_log("app:a", Level::Debug));
}

#[test]
fn session_on_missing_file_is_empty() {
	let dir = tempfile::tempdir().expect("create tempdir");
	let store = ControlStore::new(dir.path().join("control"));
	let mut session = store.open_for_update().expect("open");
	assert!(session.parse().expect("parse").is_empty());
	assert_eq!(session.path(), store.path());
}

#[test]
fn malformed_file_fails_parse() {
	let dir = tempfile::tempdir().expect("create tempdir");
	let path = dir.path().join("control");
	fs::write(&path, b"# header\nbroken line\n").expect("seed");

	let store = ControlStore::new(&path);
	let mut session = store.open_for_update().expect("open");
	assert!(matches!(session.parse(), Err(crate::ControlError::Parse(_))));
}
