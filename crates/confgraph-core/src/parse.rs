//! Parser adapter: read a file, pick a format, lower it into [`ConfigValue`].
//!
//! Every failure is classified into the pipeline's error kinds:
//! `NotFound`, `MissingDependency`, `Malformed`, or `Unexpected`.

use std::path::Path;

use tracing::debug;

use confgraph_error::{Error, ErrorKind, Result};

use crate::format::ConfigFormat;
use crate::ini::parse_ini;
use crate::value::ConfigValue;

/// Parse the configuration file at `path`.
pub fn parse_config(path: &Path) -> Result<ConfigValue> {
    let display = path.display().to_string();
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        Error::unexpected(format!("unsupported file extension for '{display}'"))
            .with_operation("parse::parse_config")
            .with_context("path", display.clone())
    })?;

    // Check capability before touching the file so a missing parser is
    // reported as such even for unreadable files.
    ensure_available(format, format.is_available())
        .map_err(|e| e.with_context("path", display.clone()))?;

    let text = read_source(path)?;
    let value = parse_str(format, &text).map_err(|e| e.with_context("path", display))?;
    debug!(path = %path.display(), %format, kind = value.kind_name(), "parsed config");
    Ok(value)
}

/// `MissingDependency` naming the cargo feature when `available` is false.
fn ensure_available(format: ConfigFormat, available: bool) -> Result<()> {
    if available {
        return Ok(());
    }
    let feature = format.feature().unwrap_or_default();
    Err(Error::missing_dependency(&format.to_string(), feature)
        .with_operation("parse::parse_config"))
}

/// Parse already-loaded text as the given format.
pub fn parse_str(format: ConfigFormat, text: &str) -> Result<ConfigValue> {
    match format {
        ConfigFormat::Ini => parse_ini(text),
        ConfigFormat::Yaml => parse_yaml(text),
        ConfigFormat::Toml => parse_toml(text),
        ConfigFormat::Json => parse_json(text),
    }
}

fn read_source(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|err| {
        let display = path.display().to_string();
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::not_found(display)
                .with_operation("parse::read")
                .set_source(err),
            _ => Error::new(ErrorKind::Unexpected, format!("cannot read '{display}': {err}"))
                .with_operation("parse::read")
                .set_source(err),
        }
    })?;
    String::from_utf8(bytes).map_err(|err| {
        Error::malformed(format!("'{}' is not valid UTF-8", path.display()))
            .with_operation("parse::read")
            .set_source(err)
    })
}

// ============================================================================
// YAML
// ============================================================================

#[cfg(feature = "yaml")]
fn parse_yaml(text: &str) -> Result<ConfigValue> {
    let doc: serde_yaml::Value = serde_yaml::from_str(text).map_err(|err| {
        Error::malformed(err.to_string())
            .with_operation("yaml::parse")
            .set_source(err)
    })?;
    Ok(lower_yaml(doc))
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(_text: &str) -> Result<ConfigValue> {
    Err(Error::missing_dependency("YAML", "yaml").with_operation("yaml::parse"))
}

#[cfg(feature = "yaml")]
fn lower_yaml(value: serde_yaml::Value) -> ConfigValue {
    use serde_yaml::Value;

    match value {
        Value::Null => ConfigValue::Null,
        Value::Bool(b) => ConfigValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ConfigValue::Integer(i),
            None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => ConfigValue::String(s),
        Value::Sequence(items) => ConfigValue::Sequence(items.into_iter().map(lower_yaml).collect()),
        Value::Mapping(map) => ConfigValue::Mapping(
            map.into_iter()
                .map(|(k, v)| (yaml_key(k), lower_yaml(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => lower_yaml(tagged.value),
    }
}

/// YAML allows non-string keys; render them as their scalar text.
#[cfg(feature = "yaml")]
fn yaml_key(key: serde_yaml::Value) -> String {
    match lower_yaml(key) {
        ConfigValue::String(s) => s,
        other => other.to_string(),
    }
}

// ============================================================================
// TOML
// ============================================================================

#[cfg(feature = "toml")]
fn parse_toml(text: &str) -> Result<ConfigValue> {
    let table: toml::Table = text.parse().map_err(|err: toml::de::Error| {
        Error::malformed(err.message().to_string())
            .with_operation("toml::parse")
            .set_source(err)
    })?;
    Ok(lower_toml(toml::Value::Table(table)))
}

#[cfg(not(feature = "toml"))]
fn parse_toml(_text: &str) -> Result<ConfigValue> {
    Err(Error::missing_dependency("TOML", "toml").with_operation("toml::parse"))
}

#[cfg(feature = "toml")]
fn lower_toml(value: toml::Value) -> ConfigValue {
    use toml::Value;

    match value {
        Value::String(s) => ConfigValue::String(s),
        Value::Integer(i) => ConfigValue::Integer(i),
        Value::Float(x) => ConfigValue::Float(x),
        Value::Boolean(b) => ConfigValue::Bool(b),
        Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        Value::Array(items) => ConfigValue::Sequence(items.into_iter().map(lower_toml).collect()),
        Value::Table(table) => {
            ConfigValue::Mapping(table.into_iter().map(|(k, v)| (k, lower_toml(v))).collect())
        }
    }
}

// ============================================================================
// JSON
// ============================================================================

#[cfg(feature = "json")]
fn parse_json(text: &str) -> Result<ConfigValue> {
    let doc: serde_json::Value = serde_json::from_str(text).map_err(|err| {
        Error::malformed(err.to_string())
            .with_operation("json::parse")
            .with_context("line", err.line().to_string())
            .set_source(err)
    })?;
    Ok(lower_json(doc))
}

#[cfg(not(feature = "json"))]
fn parse_json(_text: &str) -> Result<ConfigValue> {
    Err(Error::missing_dependency("JSON", "json").with_operation("json::parse"))
}

#[cfg(feature = "json")]
fn lower_json(value: serde_json::Value) -> ConfigValue {
    use serde_json::Value;

    match value {
        Value::Null => ConfigValue::Null,
        Value::Bool(b) => ConfigValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ConfigValue::Integer(i),
            None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => ConfigValue::String(s),
        Value::Array(items) => ConfigValue::Sequence(items.into_iter().map(lower_json).collect()),
        Value::Object(map) => {
            ConfigValue::Mapping(map.into_iter().map(|(k, v)| (k, lower_json(v))).collect())
        }
    }
}
