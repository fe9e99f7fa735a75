use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use logctl_control::{ControlStore, Level};

fn should_log(c: &mut Criterion) {
	let dir = tempfile::tempdir().expect("create tempdir");
	let store = ControlStore::new(dir.path().join("logcontrol"));
	for i in 0..100 {
		store.register("bench", &format!("component/{i}")).expect("register");
	}

	let mut group = c.benchmark_group("should_log");
	group.bench_function("registered", |b| {
		b.iter(|| store.should_log(black_box("bench:component/42"), black_box(Level::Info)))
	});
	group.bench_function("unregistered", |b| {
		b.iter(|| store.should_log(black_box("bench:missing"), black_box(Level::Debug)))
	});
	group.finish();
}

fn register_existing(c: &mut Criterion) {
	let dir = tempfile::tempdir().expect("create tempdir");
	let store = ControlStore::new(dir.path().join("logcontrol"));
	for i in 0..5000 {
		store.register("bench", &format!("filler/{i}")).expect("register");
	}
	store.register("bench", "existing").expect("register");

	c.bench_function("register_existing", |b| {
		b.iter(|| store.register(black_box("bench"), black_box("existing")).expect("register"))
	});
}

criterion_group!(benches, should_log, register_existing);
criterion_main!(benches);
