//! A small INI reader.
//!
//! Supported syntax:
//! - `[section]` headers; every key must live inside a section, and text
//!   after the closing `]` is ignored
//! - `key = value` or `key: value`, split at the first separator
//! - `#` and `;` full-line comments
//! - indented lines continue the previous value, joined with `\n`; blank
//!   lines between continuation lines are kept inside the value
//! - a bare `key` with no separator maps to `Null`
//!
//! Duplicate sections or duplicate keys within a section are rejected.

use confgraph_error::{Error, Result};

use crate::value::{ConfigValue, Mapping};

/// The section being filled while scanning.
struct OpenSection {
    name: String,
    entries: Mapping,
    /// Entry that an indented line continues.
    last: Option<usize>,
    /// Blank lines seen since `last` was written.
    blanks: usize,
}

impl OpenSection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
            last: None,
            blanks: 0,
        }
    }

    fn close(self) -> (String, ConfigValue) {
        (self.name, ConfigValue::Mapping(self.entries))
    }
}

/// Parse INI text into a mapping of sections to mappings of keys.
pub fn parse_ini(text: &str) -> Result<ConfigValue> {
    let mut sections: Mapping = Vec::new();
    let mut current: Option<OpenSection> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            if let Some(section) = current.as_mut() {
                section.blanks += 1;
            }
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = line.len() != trimmed.len();
        if indented
            && let Some(section) = current.as_mut()
            && let Some(last) = section.last
        {
            let blanks = std::mem::take(&mut section.blanks);
            append_continuation(&mut section.entries[last].1, trimmed, blanks);
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let Some(close) = rest.rfind(']') else {
                return Err(malformed(line_no, "unterminated section header"));
            };
            let name = rest[..close].trim();
            if name.is_empty() {
                return Err(malformed(line_no, "empty section name"));
            }
            if let Some(section) = current.take() {
                sections.push(section.close());
            }
            if sections.iter().any(|(k, _)| k == name) {
                return Err(malformed(line_no, &format!("duplicate section '{name}'")));
            }
            current = Some(OpenSection::new(name));
            continue;
        }

        let Some(section) = current.as_mut() else {
            return Err(malformed(line_no, "key/value pair before any section header"));
        };

        let (key, value) = match trimmed.find(['=', ':']) {
            Some(pos) => (
                trimmed[..pos].trim(),
                ConfigValue::String(trimmed[pos + 1..].trim().to_string()),
            ),
            None => (trimmed, ConfigValue::Null),
        };
        if key.is_empty() {
            return Err(malformed(line_no, "empty key"));
        }
        if section.entries.iter().any(|(k, _)| k == key) {
            return Err(malformed(line_no, &format!("duplicate key '{key}'")));
        }
        section.entries.push((key.to_string(), value));
        section.last = Some(section.entries.len() - 1);
        section.blanks = 0;
    }

    if let Some(section) = current {
        sections.push(section.close());
    }
    Ok(ConfigValue::Mapping(sections))
}

/// Append a continuation line, keeping `blanks` empty lines before it.
/// An empty head value (`key =` followed by indented lines) is dropped.
fn append_continuation(value: &mut ConfigValue, text: &str, blanks: usize) {
    match value {
        ConfigValue::String(s) if s.is_empty() => s.push_str(text),
        ConfigValue::String(s) => {
            for _ in 0..=blanks {
                s.push('\n');
            }
            s.push_str(text);
        }
        other => *other = ConfigValue::String(text.to_string()),
    }
}

fn malformed(line: usize, what: &str) -> Error {
    Error::malformed(format!("line {line}: {what}"))
        .with_operation("ini::parse")
        .with_context("line", line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use confgraph_error::ErrorKind;

    fn section<'a>(value: &'a ConfigValue, name: &str) -> &'a ConfigValue {
        value.get(name).expect("section present")
    }

    #[test]
    fn parses_sections_and_keys() {
        let text = "\
# global comment
[server]
host = localhost
port: 8080

[database]
; comment
url = postgres://db/app
";
        let value = parse_ini(text).unwrap();
        assert_eq!(value.len(), 2);
        let server = section(&value, "server");
        assert_eq!(server.get("host").and_then(ConfigValue::as_str), Some("localhost"));
        assert_eq!(server.get("port").and_then(ConfigValue::as_str), Some("8080"));
        let db = section(&value, "database");
        assert_eq!(
            db.get("url").and_then(ConfigValue::as_str),
            Some("postgres://db/app")
        );
    }

    #[test]
    fn keeps_document_order() {
        let value = parse_ini("[b]\nz=1\na=2\n[a]\n").unwrap();
        let ConfigValue::Mapping(sections) = &value else {
            panic!("expected mapping");
        };
        let names: Vec<_> = sections.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        let ConfigValue::Mapping(keys) = section(&value, "b") else {
            panic!("expected mapping");
        };
        let keys: Vec<_> = keys.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn joins_continuation_lines() {
        let value = parse_ini("[s]\nlist =\n  one\n  two\nnext = x\n").unwrap();
        let s = section(&value, "s");
        assert_eq!(s.get("list").and_then(ConfigValue::as_str), Some("one\ntwo"));
        assert_eq!(s.get("next").and_then(ConfigValue::as_str), Some("x"));
    }

    #[test]
    fn blank_lines_inside_a_continued_value_are_kept() {
        let value = parse_ini("[s]\ntext = first\n\n  second\n\nnext = x\n").unwrap();
        let s = section(&value, "s");
        assert_eq!(s.get("text").and_then(ConfigValue::as_str), Some("first\n\nsecond"));
        assert_eq!(s.get("next").and_then(ConfigValue::as_str), Some("x"));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn text_after_section_header_is_ignored() {
        let value = parse_ini("[server] ; main listener\nport = 80\n").unwrap();
        assert_eq!(
            section(&value, "server").get("port").and_then(ConfigValue::as_str),
            Some("80")
        );
    }

    #[test]
    fn bare_key_is_null() {
        let value = parse_ini("[flags]\nverbose\n").unwrap();
        assert_eq!(section(&value, "flags").get("verbose"), Some(&ConfigValue::Null));
    }

    #[test]
    fn value_may_contain_separators() {
        let value = parse_ini("[s]\nurl = http://x:1/a=b\n").unwrap();
        assert_eq!(
            section(&value, "s").get("url").and_then(ConfigValue::as_str),
            Some("http://x:1/a=b")
        );
    }

    #[test]
    fn rejects_malformed_input() {
        for (text, line) in [
            ("key = 1\n", "1"),
            ("[s]\n[s]\n", "2"),
            ("[s]\na=1\na=2\n", "3"),
            ("[open\n", "1"),
            ("[]\n", "1"),
            ("[s]\n= value\n", "2"),
        ] {
            let err = parse_ini(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Malformed, "{text:?}");
            assert_eq!(err.context_value("line"), Some(line), "{text:?}");
        }
    }

    #[test]
    fn empty_input_is_empty_mapping() {
        assert_eq!(parse_ini("").unwrap(), ConfigValue::mapping());
        assert_eq!(parse_ini("# only comments\n\n").unwrap(), ConfigValue::mapping());
    }
}
