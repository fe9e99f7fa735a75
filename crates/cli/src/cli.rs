use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "logctl")]
#[command(about = "Show and switch log levels in a shared log control file")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Only touch records of this application
	#[arg(short, long, value_name = "APP")]
	pub application: Option<String>,

	/// Only touch records of this component; a trailing `/` matches the whole subtree
	#[arg(short, long, value_name = "COMPONENT")]
	pub component: Option<String>,

	/// Control file to edit (defaults to $LOG_CONTROL_PATH or the runtime dir)
	#[arg(long, value_name = "PATH")]
	pub control: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,

	/// Level changes such as `+debug`, `-info` or `all`
	#[arg(value_name = "CHANGE", allow_hyphen_values = true)]
	pub changes: Vec<String>,
}
