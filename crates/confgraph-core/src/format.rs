//! Configuration format detection.

use std::path::Path;

use strum_macros::{Display, EnumIter, IntoStaticStr};

/// A supported configuration format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum ConfigFormat {
    #[strum(serialize = "INI")]
    Ini,
    #[strum(serialize = "YAML")]
    Yaml,
    #[strum(serialize = "TOML")]
    Toml,
    #[strum(serialize = "JSON")]
    Json,
}

impl ConfigFormat {
    /// File extensions (lowercase, without the dot) recognized for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ConfigFormat::Ini => &["ini", "cfg", "conf"],
            ConfigFormat::Yaml => &["yaml", "yml"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Json => &["json"],
        }
    }

    /// The cargo feature that compiles this format's parser in.
    /// INI is always available.
    pub fn feature(&self) -> Option<&'static str> {
        match self {
            ConfigFormat::Ini => None,
            ConfigFormat::Yaml => Some("yaml"),
            ConfigFormat::Toml => Some("toml"),
            ConfigFormat::Json => Some("json"),
        }
    }

    /// Whether the parser for this format is compiled into this build.
    pub fn is_available(&self) -> bool {
        match self {
            ConfigFormat::Ini => true,
            ConfigFormat::Yaml => cfg!(feature = "yaml"),
            ConfigFormat::Toml => cfg!(feature = "toml"),
            ConfigFormat::Json => cfg!(feature = "json"),
        }
    }

    /// Detect the format from an extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        <Self as strum::IntoEnumIterator>::iter().find(|f| f.extensions().contains(&ext.as_str()))
    }

    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Every extension of every format, whether or not its parser is compiled in.
    pub fn all_extensions() -> Vec<&'static str> {
        <Self as strum::IntoEnumIterator>::iter()
            .flat_map(|f| f.extensions().iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/example.ini")),
            Some(ConfigFormat::Ini)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("complex.YML")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("Cargo.toml")),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("README.md")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn lists_all_extensions() {
        let all = ConfigFormat::all_extensions();
        for ext in ["ini", "cfg", "conf", "yaml", "yml", "toml", "json"] {
            assert!(all.contains(&ext), "missing {ext}");
        }
    }

    #[test]
    fn ini_is_always_available() {
        assert!(ConfigFormat::Ini.is_available());
        assert_eq!(ConfigFormat::Ini.feature(), None);
        assert_eq!(ConfigFormat::Yaml.to_string(), "YAML");
    }
}
