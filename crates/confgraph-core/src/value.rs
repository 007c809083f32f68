//! Normalized configuration tree shared by every format.

use std::fmt;

/// Ordered key/value pairs of a mapping, in source order where the format keeps one.
pub type Mapping = Vec<(String, ConfigValue)>;

/// A parsed configuration document.
///
/// Every format parser lowers its native document model into this closed
/// shape, so the graph builder only has to match seven variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(Mapping),
}

impl ConfigValue {
    /// Create an empty mapping.
    pub fn mapping() -> Self {
        ConfigValue::Mapping(Vec::new())
    }

    /// True for `Sequence` and `Mapping`.
    pub fn is_container(&self) -> bool {
        matches!(self, ConfigValue::Sequence(_) | ConfigValue::Mapping(_))
    }

    /// True for an empty `Sequence` or `Mapping`.
    pub fn is_empty_container(&self) -> bool {
        match self {
            ConfigValue::Sequence(items) => items.is_empty(),
            ConfigValue::Mapping(entries) => entries.is_empty(),
            _ => false,
        }
    }

    /// Short type name, used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Sequence(_) => "sequence",
            ConfigValue::Mapping(_) => "mapping",
        }
    }

    /// Look up a key in a mapping. Returns `None` for non-mappings.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        match self {
            ConfigValue::Mapping(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number of direct children (0 for scalars).
    pub fn len(&self) -> usize {
        match self {
            ConfigValue::Sequence(items) => items.len(),
            ConfigValue::Mapping(entries) => entries.len(),
            _ => 0,
        }
    }

    /// Depth of the deepest container nesting; scalars are depth 0.
    pub fn depth(&self) -> usize {
        match self {
            ConfigValue::Sequence(items) => 1 + items.iter().map(Self::depth).max().unwrap_or(0),
            ConfigValue::Mapping(entries) => {
                1 + entries.iter().map(|(_, v)| v.depth()).max().unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// Scalars print as their value; containers print as `{}`/`[]` with a count.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "null"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Integer(i) => write!(f, "{i}"),
            ConfigValue::Float(x) => write!(f, "{x:?}"),
            ConfigValue::String(s) => write!(f, "{s}"),
            ConfigValue::Sequence(items) if items.is_empty() => write!(f, "[]"),
            ConfigValue::Sequence(items) => write!(f, "[{} items]", items.len()),
            ConfigValue::Mapping(entries) if entries.is_empty() => write!(f, "{{}}"),
            ConfigValue::Mapping(entries) => write!(f, "{{{} keys}}", entries.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_display() {
        assert_eq!(ConfigValue::Null.to_string(), "null");
        assert_eq!(ConfigValue::Bool(true).to_string(), "true");
        assert_eq!(ConfigValue::Integer(-3).to_string(), "-3");
        assert_eq!(ConfigValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ConfigValue::String("x y".into()).to_string(), "x y");
        assert_eq!(ConfigValue::mapping().to_string(), "{}");
        assert_eq!(ConfigValue::Sequence(vec![]).to_string(), "[]");
    }

    #[test]
    fn lookup_and_depth() {
        let value = ConfigValue::Mapping(vec![
            ("name".into(), ConfigValue::String("svc".into())),
            (
                "ports".into(),
                ConfigValue::Sequence(vec![ConfigValue::Integer(80), ConfigValue::Integer(443)]),
            ),
        ]);
        assert_eq!(value.get("name").and_then(ConfigValue::as_str), Some("svc"));
        assert_eq!(value.get("ports").map(ConfigValue::len), Some(2));
        assert!(value.get("missing").is_none());
        assert_eq!(value.depth(), 2);
        assert_eq!(ConfigValue::Integer(1).depth(), 0);
    }

    #[test]
    fn empty_containers() {
        assert!(ConfigValue::mapping().is_empty_container());
        assert!(ConfigValue::Sequence(vec![]).is_container());
        assert!(!ConfigValue::String(String::new()).is_empty_container());
    }
}
