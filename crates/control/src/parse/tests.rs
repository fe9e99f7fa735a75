use pretty_assertions::assert_eq;

use super::*;

const FILE: &[u8] = b"# log control file\n# second comment\nmyapp:a/b  ON  ON  ON  ON OFF\nother:net/http OFF OFF  ON  ON  ON\n";

#[test]
fn parses_records_after_comments() {
	let records = parse_records(FILE).expect("parse");
	assert_eq!(
		records,
		vec![
			RecordSpan {
				application: "myapp".into(),
				component: "a/b".into(),
				toggle_offset: 45,
				line: 3,
			},
			RecordSpan {
				application: "other".into(),
				component: "net/http".into(),
				toggle_offset: 80,
				line: 4,
			},
		]
	);
	assert_eq!(&FILE[45..65], b"  ON  ON  ON  ON OFF");
	assert_eq!(&FILE[80..100], b" OFF OFF  ON  ON  ON");
	assert_eq!(records[1].key(), "other:net/http");
}

#[test]
fn empty_buffer_has_no_records() {
	assert!(parse_records(b"").expect("parse").is_empty());
}

#[test]
fn comment_lines_are_not_validated() {
	let records = parse_records(b"#no colon here at all\n#:\n").expect("parse");
	assert!(records.is_empty());
}

#[test]
fn final_line_without_newline_is_parsed() {
	let records = parse_records(b"a:b  ON  ON  ON  ON OFF").expect("parse");
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].toggle_offset, 3);
}

#[test]
fn application_ends_at_first_colon() {
	let records = parse_records(b"a:b:c  ON  ON  ON  ON OFF\n").expect("parse");
	assert_eq!(records[0].application, "a");
	assert_eq!(records[0].component, "b:c");
}

#[test]
fn missing_colon_reports_line() {
	let err = parse_records(b"# header\nno-separator  ON  ON  ON  ON OFF\n").expect_err("malformed");
	assert_eq!(
		err,
		ParseError::MissingColon {
			line: 2,
			text: "no-separator  ON  ON  ON  ON OFF".into(),
		}
	);
}

#[test]
fn empty_line_is_malformed() {
	let err = parse_records(b"a:b  ON  ON  ON  ON OFF\n\n").expect_err("malformed");
	assert!(matches!(err, ParseError::MissingColon { line: 2, .. }));
}

#[test]
fn missing_space_after_component() {
	let err = parse_records(b"app:component\n").expect_err("malformed");
	assert!(matches!(err, ParseError::MissingSpace { line: 1, .. }));
}

#[test]
fn nothing_after_colon_is_truncated() {
	let err = parse_records(b"app:\n").expect_err("malformed");
	assert!(matches!(err, ParseError::Truncated { line: 1, .. }));
}

#[test]
fn short_toggle_region_is_truncated() {
	let err = parse_records(b"app:comp  ON  ON  ON  ON OF\n").expect_err("malformed");
	assert!(matches!(err, ParseError::Truncated { line: 1, .. }));
}

#[test]
fn one_bad_line_fails_whole_parse() {
	let buf = b"# header\nok:a  ON  ON  ON  ON OFF\nbroken\nok:b  ON  ON  ON  ON OFF\n";
	assert!(parse_records(buf).is_err());
}

#[test]
fn key_presence_requires_line_start_and_separator() {
	assert!(key_present(FILE, "myapp:a/b"));
	assert!(key_present(FILE, "other:net/http"));
	assert!(!key_present(FILE, "myapp:a"), "prefix of a component must not match");
	assert!(!key_present(FILE, "app:a/b"), "suffix of an application must not match");
	assert!(!key_present(b"myapp:a/b  ON  ON  ON  ON OFF\n", "myapp:a/b"), "first line has no preceding newline");
}
