//! Source file identity.

use std::path::{Path, PathBuf};

/// One configuration file queued for conversion.
///
/// The display name is the file name including its extension; it doubles as
/// the artifact stem and the graph title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePath {
    path: PathBuf,
    name: String,
}

impl SourcePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = std::path::absolute(&path).unwrap_or(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name with extension, e.g. `example.yaml`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the source currently exists as a regular file.
    pub fn is_file(&self) -> bool {
        self.path.is_file()
    }

    /// Path relative to `root` when it lives under it, otherwise the full path.
    pub fn relative_to(&self, root: &Path) -> String {
        let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
        self.path
            .strip_prefix(&root)
            .unwrap_or(&self.path)
            .display()
            .to_string()
    }
}
