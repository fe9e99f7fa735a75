//! Level change tokens and record filters.

use logctl_control::{Level, UnknownLevel, WritableRecord};
use thiserror::Error;

/// Levels a [`Change`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
	All,
	One(Level),
}

/// A parsed `[+|-]<level|all>` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
	pub target: Target,
	pub enable: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChangeError {
	#[error("empty level change")]
	Empty,
	#[error("invalid level change '{token}': {source}")]
	UnknownLevel {
		token: String,
		#[source]
		source: UnknownLevel,
	},
}

impl Change {
	pub fn parse(token: &str) -> Result<Self, ChangeError> {
		let (enable, name) = match token.as_bytes().first() {
			Some(b'+') => (true, &token[1..]),
			Some(b'-') => (false, &token[1..]),
			_ => (true, token),
		};
		if name.is_empty() {
			return Err(ChangeError::Empty);
		}
		let target = if name.eq_ignore_ascii_case("all") {
			Target::All
		} else {
			let level = name.parse().map_err(|source| ChangeError::UnknownLevel {
				token: token.to_string(),
				source,
			})?;
			Target::One(level)
		};
		Ok(Self { target, enable })
	}

	pub fn apply(&self, record: &mut WritableRecord<'_>) {
		match self.target {
			Target::All => record.set_all(self.enable),
			Target::One(level) => record.set_enabled(level, self.enable),
		}
	}
}

/// Parses every token, failing on the first invalid one.
pub fn parse_changes<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Change>, ChangeError> {
	tokens.iter().map(|t| Change::parse(t.as_ref())).collect()
}

/// Selects records by application and component.
#[derive(Debug, Default, Clone)]
pub struct Filter {
	pub application: Option<String>,
	pub component: Option<String>,
}

impl Filter {
	/// Empty names match everything, like an omitted flag.
	pub fn new(application: Option<String>, component: Option<String>) -> Self {
		Self {
			application: application.filter(|a| !a.is_empty()),
			component: component.filter(|c| !c.is_empty()),
		}
	}

	pub fn matches(&self, application: &str, component: &str) -> bool {
		if self.application.as_deref().is_some_and(|a| a != application) {
			return false;
		}
		match self.component.as_deref() {
			None => true,
			Some(prefix) if prefix.ends_with('/') => component.starts_with(prefix),
			Some(exact) => exact == component,
		}
	}
}
