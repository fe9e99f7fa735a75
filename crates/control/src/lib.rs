//! Runtime log level control backed by a shared, memory-mapped file.
//!
//! Every participating process maps the same control file. Each line holds the
//! ON/OFF state of the five severity levels for one `application:component`
//! key, so toggling a level is a 4-byte write that every reader observes on
//! its next lookup without restarting.
//!
//! * [`ControlStore`]: registration, loading and the [`ControlStore::should_log`] hot path
//! * [`UpdateSession`]: in-place editing of toggle bits (used by the `logctl` tool)
//! * [`MappedRegion`]: generation-tracked file mapping
//! * [`CrossProcessLock`]: advisory `<control-path>.lock` file lock
//! * [`parse_records`]: control file parser
//!
//! ```no_run
//! use logctl_control::{ControlStore, Level};
//!
//! let store = ControlStore::new("/tmp/logcontrol");
//! store.register("myapp", "net/http")?;
//! assert!(!store.should_log("myapp:net/http", Level::Debug));
//! # Ok::<(), logctl_control::ControlError>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod level;
pub mod lock;
pub mod parse;
pub mod paths;
pub mod region;
pub mod store;
pub mod toggle;
pub mod update;

pub use error::{ControlError, LockError, ParseError, Result};
pub use level::{Level, UnknownLevel};
pub use lock::{CrossProcessLock, LockGuard, LockOptions};
pub use parse::{RecordSpan, parse_records};
pub use paths::{CONTROL_PATH_ENV, default_control_path, lock_path_for};
pub use region::{Access, MappedRegion, Sharing};
pub use store::{ControlStore, RecordSnapshot, key_for};
pub use toggle::{DEFAULT_TOGGLES, OFF, ON, TOGGLE_REGION_LEN, ToggleRef, ToggleState};
pub use update::{UpdateSession, WritableRecord};
