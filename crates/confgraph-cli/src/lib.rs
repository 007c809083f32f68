//! confgraph command-line interface: discover configuration files, turn
//! each into a DOT description, and render it with Graphviz.

pub mod artifact;
pub mod discovery;
pub mod options;
pub mod pipeline;
pub mod render;
pub mod report;

use std::path::{Path, PathBuf};

use tracing::info;

use confgraph_core::Result;

pub use artifact::{ArtifactPaths, ensure_output_dir, write_description};
pub use discovery::discover_sources;
pub use options::{GraphOptions, RenderOptions};
pub use pipeline::{BatchContext, process_sources};
pub use render::{DotRenderer, ImageRenderer, RendererProbe};
pub use report::{BatchReport, SkipReason, SourceReport, Stage, StageOutcome};

/// Options for running confgraph.
///
/// Relative paths are resolved against `root`.
#[derive(Debug, Clone)]
pub struct ConfgraphOptions {
    pub root: PathBuf,
    pub config_dir: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub graph: GraphOptions,
    pub render: RenderOptions,
}

impl ConfgraphOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_dir: None,
            manifest: None,
            files: Vec::new(),
            output_dir: PathBuf::from("output_examples"),
            graph: GraphOptions::default(),
            render: RenderOptions::default(),
        }
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    pub fn with_files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_graph(mut self, graph: GraphOptions) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Resolve `path` against the project root unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn config_dir_path(&self) -> Option<PathBuf> {
        self.config_dir.as_deref().map(|p| self.resolve(p))
    }

    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.manifest.as_deref().map(|p| self.resolve(p))
    }

    pub fn output_dir_path(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    /// Probe for the renderer according to the render options.
    pub fn renderer_probe(&self) -> RendererProbe {
        if self.render.no_render {
            RendererProbe::disabled(&self.render.renderer)
        } else {
            RendererProbe::detect(&self.render.renderer)
        }
    }
}

/// Main entry point.
///
/// Fails only when the output directory cannot be created; every per-source
/// problem is recorded in the returned report.
pub fn run_main(opts: &ConfgraphOptions) -> Result<BatchReport> {
    let renderer = DotRenderer::new(opts.renderer_probe(), opts.render.timeout());
    run_with_renderer(opts, &renderer)
}

/// Like [`run_main`], with a caller-supplied renderer.
pub fn run_with_renderer<R>(opts: &ConfgraphOptions, renderer: &R) -> Result<BatchReport>
where
    R: ImageRenderer + ?Sized,
{
    let output_dir = ensure_output_dir(&opts.output_dir_path())?;
    info!(dir = %output_dir.display(), "output directory ready");

    let sources = discover_sources(opts);
    let build = opts.graph.to_build_options();
    let ctx = BatchContext {
        root: &opts.root,
        output_dir: &output_dir,
        build: &build,
    };
    Ok(process_sources(&sources, &ctx, renderer))
}
