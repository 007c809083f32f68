//! Source enumeration for confgraph.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use ignore::WalkBuilder;
use tracing::{info, warn};

use confgraph_core::{ConfigFormat, SourcePath};

use crate::ConfgraphOptions;

/// Enumerate candidate sources in processing order.
///
/// Order: explicit `opts.files` as given, then supported files under the
/// configuration directory sorted by path, then the project manifest.
/// Existence is not checked here beyond what the directory walk yields;
/// the orchestrator re-checks right before processing.
pub fn discover_sources(opts: &ConfgraphOptions) -> Vec<SourcePath> {
    let discovery_start = Instant::now();

    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    // Helper to add a path if not seen
    let mut add_path = |path: PathBuf| {
        let source = SourcePath::new(path);
        if seen.insert(source.path().to_path_buf()) {
            sources.push(source);
        }
    };

    // Add explicit files
    for file in &opts.files {
        add_path(opts.resolve(file));
    }

    // Walk the configuration directory
    if let Some(dir) = opts.config_dir_path() {
        for path in walk_config_dir(&dir) {
            add_path(path);
        }
    }

    if let Some(manifest) = opts.manifest_path() {
        add_path(manifest);
    }

    info!(
        "Source discovery: {:.2}s ({} sources)",
        discovery_start.elapsed().as_secs_f64(),
        sources.len()
    );
    sources
}

/// Files under `dir` with a recognized configuration extension, sorted.
fn walk_config_dir(dir: &std::path::Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "configuration directory not found");
        return Vec::new();
    }

    let extensions: HashSet<&str> = ConfigFormat::all_extensions().into_iter().collect();
    let mut files = Vec::new();

    let mut builder = WalkBuilder::new(dir);
    builder.standard_filters(true).follow_links(false);

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        // Only process files
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };

        if extensions.contains(ext.to_ascii_lowercase().as_str()) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files
}
