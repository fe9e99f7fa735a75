use std::fmt::Write;

use chrono::{DateTime, Local, SecondsFormat};

/// How the timestamp column is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimeFormat {
	/// RFC 3339 with second precision in local time, e.g. `2024-05-01T12:00:00+02:00`.
	#[default]
	Rfc3339,
	/// Nanoseconds since the Unix epoch.
	UnixNanos,
	/// A chrono `strftime` layout such as `"%H:%M:%S%.3f"`.
	Layout(String),
	/// Empty column; the line starts with the tab separator.
	Disabled,
}

impl TimeFormat {
	pub(crate) fn render(&self, now: DateTime<Local>) -> String {
		match self {
			TimeFormat::Rfc3339 => now.to_rfc3339_opts(SecondsFormat::Secs, true),
			TimeFormat::UnixNanos => now.timestamp_nanos_opt().unwrap_or_default().to_string(),
			TimeFormat::Layout(layout) => {
				let mut out = String::new();
				// Invalid layouts surface as fmt errors rather than panics.
				match write!(out, "{}", now.format(layout)) {
					Ok(()) => out,
					Err(_) => now.to_rfc3339_opts(SecondsFormat::Secs, true),
				}
			}
			TimeFormat::Disabled => String::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;

	use super::*;

	fn fixed() -> DateTime<Local> {
		Local.timestamp_opt(1_700_000_000, 123).single().expect("valid timestamp")
	}

	#[test]
	fn unix_nanos() {
		assert_eq!(TimeFormat::UnixNanos.render(fixed()), "1700000000000000123");
	}

	#[test]
	fn rfc3339_round_trips_instant() {
		let rendered = TimeFormat::Rfc3339.render(fixed());
		let parsed = DateTime::parse_from_rfc3339(&rendered).expect("rfc3339");
		assert_eq!(parsed.timestamp(), 1_700_000_000);
	}

	#[test]
	fn layout_and_invalid_layout() {
		let now = fixed();
		assert_eq!(TimeFormat::Layout("%s".into()).render(now), "1700000000");
		let fallback = TimeFormat::Layout("%Q".into()).render(now);
		assert_eq!(fallback, TimeFormat::Rfc3339.render(now));
	}

	#[test]
	fn disabled_is_empty() {
		assert_eq!(TimeFormat::Disabled.render(fixed()), "");
	}
}
