//! Line logger driven by a shared control file.
//!
//! Each [`Logger`] registers its `application:component` key when built and
//! consults [`ControlStore::should_log`] on every call, so levels can be
//! switched by the `logctl` tool while the process runs.
//!
//! Output lines are tab separated: `time`, `component`, `LEVEL`, `message`.
//!
//! ```no_run
//! use logctl_logger::{Logger, TimeFormat};
//!
//! let log = Logger::builder("net/http").time_format(TimeFormat::Disabled).build()?;
//! log.info("listening");
//! log.debug("not shown until enabled with `logctl -c net/http +debug`");
//! # Ok::<(), logctl_logger::LoggerError>(())
//! ```
//!
//! [`ControlStore::should_log`]: logctl_control::ControlStore::should_log

#![warn(missing_docs)]

mod error;
mod logger;
mod time;

pub use error::LoggerError;
pub use logctl_control::{ControlStore, Level};
pub use logger::{Logger, LoggerBuilder, application_name, module_component};
pub use time::TimeFormat;

/// Starts a [`LoggerBuilder`] whose component is the calling module's path,
/// with `::` replaced by `/`.
#[macro_export]
macro_rules! component_logger {
	() => {
		$crate::Logger::builder($crate::module_component(module_path!()))
	};
}
