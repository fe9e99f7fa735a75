//! `logctl`: lists the records of a log control file and flips their level
//! toggles in place.
//!
//! ```text
//! logctl                      # list every record
//! logctl -a myapp +debug      # enable DEBUG for all of myapp
//! logctl -c net/ -all +fatal  # only FATAL for net/ and below
//! ```

mod change;
mod cli;

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use logctl_control::{ControlStore, default_control_path};
use tracing::debug;

use crate::change::{Filter, parse_changes};

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_writer(io::stderr)
		.with_max_level(if cli.verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::WARN
		})
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let stdout = io::stdout();
	run(cli, &mut stdout.lock())
}

/// Applies the requested changes and prints every matching record to `out`.
fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
	let changes = parse_changes(&cli.changes)?;
	let filter = Filter::new(cli.application, cli.component);
	let path = cli.control.unwrap_or_else(default_control_path);
	debug!(path = %path.display(), changes = changes.len(), "opening control file");

	let store = ControlStore::new(&path);
	let mut session = store
		.open_for_update()
		.with_context(|| format!("opening log control file {}", path.display()))?;

	let mut matched = 0usize;
	for mut record in session.parse()? {
		if !filter.matches(&record.application, &record.component) {
			continue;
		}
		for change in &changes {
			change.apply(&mut record);
		}
		writeln!(out, "{record}")?;
		matched += 1;
	}
	debug!(matched, "records processed");

	if !changes.is_empty() {
		session.flush()?;
	}
	session.close();
	Ok(())
}
