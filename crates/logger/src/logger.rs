use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use logctl_control::{ControlStore, Level, key_for};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::LoggerError;
use crate::time::TimeFormat;

/// Configures and builds a [`Logger`].
pub struct LoggerBuilder {
	component: String,
	application: Option<String>,
	writer: Option<Box<dyn Write + Send>>,
	time_format: TimeFormat,
	control: Option<Arc<ControlStore>>,
}

impl LoggerBuilder {
	/// Overrides the application name (defaults to [`application_name`]).
	pub fn application(mut self, application: impl Into<String>) -> Self {
		self.application = Some(application.into());
		self
	}

	/// Overrides the component name.
	pub fn component(mut self, component: impl Into<String>) -> Self {
		self.component = component.into();
		self
	}

	/// Sends output to `writer` instead of stdout.
	pub fn writer(mut self, writer: impl Write + Send + 'static) -> Self {
		self.writer = Some(Box::new(writer));
		self
	}

	/// Sets how timestamps are rendered.
	pub fn time_format(mut self, time_format: TimeFormat) -> Self {
		self.time_format = time_format;
		self
	}

	/// Uses `control` instead of [`ControlStore::global`].
	pub fn control(mut self, control: Arc<ControlStore>) -> Self {
		self.control = Some(control);
		self
	}

	/// Registers the logger's key and returns the logger.
	pub fn build(self) -> Result<Logger, LoggerError> {
		let application = self.application.unwrap_or_else(application_name);
		let control = self.control.unwrap_or_else(ControlStore::global);
		let key = key_for(&application, &self.component);

		control
			.register(&application, &self.component)
			.map_err(|source| LoggerError::Register { key: key.clone(), source })?;
		debug!(%key, path = %control.path().display(), "logger registered");

		Ok(Logger {
			control,
			component: self.component,
			key,
			writer: Mutex::new(self.writer.unwrap_or_else(|| Box::new(io::stdout()))),
			time_format: self.time_format,
		})
	}
}

/// Writes tab-separated lines for the levels enabled in the control file.
pub struct Logger {
	control: Arc<ControlStore>,
	component: String,
	key: String,
	writer: Mutex<Box<dyn Write + Send>>,
	time_format: TimeFormat,
}

impl Logger {
	/// Starts building a logger for `component`.
	pub fn builder(component: impl Into<String>) -> LoggerBuilder {
		LoggerBuilder {
			component: component.into(),
			application: None,
			writer: None,
			time_format: TimeFormat::default(),
			control: None,
		}
	}

	/// `application:component` key this logger is registered under.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Component column of every line.
	pub fn component(&self) -> &str {
		&self.component
	}

	/// Whether `level` is currently enabled for this logger.
	pub fn enabled(&self, level: Level) -> bool {
		self.control.should_log(&self.key, level)
	}

	/// Writes `msg` at `level` if enabled. A single trailing newline is dropped.
	///
	/// Write errors are ignored.
	pub fn log(&self, level: Level, msg: impl Display) {
		if !self.enabled(level) {
			return;
		}
		let msg = msg.to_string();
		let msg = msg.strip_suffix('\n').unwrap_or(&msg);
		let line = format!(
			"{}\t{}\t{}\t{}\n",
			self.time_format.render(Local::now()),
			self.component,
			level,
			msg
		);
		let _ = self.writer.lock().write_all(line.as_bytes());
	}

	/// Logs at FATAL. Termination is left to the caller; see [`fatal_exit`](Self::fatal_exit).
	pub fn fatal(&self, msg: impl Display) {
		self.log(Level::Fatal, msg);
	}

	/// Logs at FATAL, flushes the writer and exits the process with status 1.
	///
	/// The process exits even when FATAL is disabled for this key.
	pub fn fatal_exit(&self, msg: impl Display) -> ! {
		self.fatal(msg);
		let _ = self.flush();
		std::process::exit(1)
	}

	/// Logs at ERROR.
	pub fn error(&self, msg: impl Display) {
		self.log(Level::Error, msg);
	}

	/// Logs at WARNING.
	pub fn warn(&self, msg: impl Display) {
		self.log(Level::Warning, msg);
	}

	/// Logs at INFO.
	pub fn info(&self, msg: impl Display) {
		self.log(Level::Info, msg);
	}

	/// Logs at DEBUG.
	pub fn debug(&self, msg: impl Display) {
		self.log(Level::Debug, msg);
	}

	/// Flushes the underlying writer.
	pub fn flush(&self) -> io::Result<()> {
		self.writer.lock().flush()
	}
}

impl std::fmt::Debug for Logger {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Logger")
			.field("key", &self.key)
			.field("time_format", &self.time_format)
			.finish_non_exhaustive()
	}
}

/// File name of the running executable, used as the default application.
pub fn application_name() -> String {
	std::env::args_os()
		.next()
		.as_deref()
		.map(Path::new)
		.and_then(Path::file_stem)
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_else(|| "unknown".to_string())
}

/// Converts a Rust module path into a `/`-delimited component.
pub fn module_component(module_path: &str) -> String {
	module_path.replace("::", "/")
}
