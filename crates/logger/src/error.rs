use logctl_control::ControlError;
use thiserror::Error;

/// Errors building a [`Logger`](crate::Logger).
#[derive(Debug, Error)]
pub enum LoggerError {
	/// The key could not be registered in the control file.
	#[error("registering logger {key} to log control failed: {source}")]
	Register {
		/// `application:component` key of the logger.
		key: String,
		/// The underlying control file error.
		#[source]
		source: ControlError,
	},
}
