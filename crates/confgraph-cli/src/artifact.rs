//! Artifact paths and the DOT file writer.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use confgraph_core::{Error, ErrorKind, Result, SourcePath};
use confgraph_dot::GraphDescription;

/// Output locations for one source: `<dir>/<file_name>.dot` and `<dir>/<file_name>.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub description: PathBuf,
    pub image: PathBuf,
}

impl ArtifactPaths {
    pub fn for_source(output_dir: &Path, source: &SourcePath) -> Self {
        Self {
            description: output_dir.join(format!("{}.dot", source.name())),
            image: output_dir.join(format!("{}.png", source.name())),
        }
    }
}

/// Create the output directory (and parents). The only fatal error of a run.
pub fn ensure_output_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|err| {
        Error::new(
            ErrorKind::OutputDirFailed,
            format!("cannot create output directory '{}': {err}", dir.display()),
        )
        .with_operation("artifact::ensure_output_dir")
        .set_source(err)
    })?;
    Ok(std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf()))
}

/// Write `description` to `path` as UTF-8, truncating previous content.
pub fn write_description(description: &GraphDescription, path: &Path) -> Result<()> {
    let io_failure = |err: std::io::Error| {
        Error::io_failure(format!("cannot write '{}': {err}", path.display()))
            .with_operation("artifact::write_description")
            .with_context("path", path.display().to_string())
            .set_source(err)
    };

    let mut file = File::create(path).map_err(io_failure)?;
    file.write_all(description.text.as_bytes())
        .map_err(io_failure)?;
    file.flush().map_err(io_failure)?;
    debug!(path = %path.display(), bytes = description.text.len(), "description written");
    Ok(())
}
