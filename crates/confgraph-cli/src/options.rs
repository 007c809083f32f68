//! Shared CLI options for confgraph.
//!
//! The binary flattens these groups into its argument parser; library users
//! build them with the `with_*` helpers.

use std::time::Duration;

use clap::Args;

use confgraph_dot::{BuildOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LABEL_LEN};

/// Default renderer binary.
pub const DEFAULT_RENDERER: &str = "dot";

/// Default wall-clock bound for one renderer invocation, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Options for graph description generation.
#[derive(Args, Debug, Clone)]
pub struct GraphOptions {
    /// Maximum nesting depth rendered before a source is rejected.
    #[arg(long = "depth-limit", default_value_t = DEFAULT_MAX_DEPTH)]
    pub depth_limit: usize,

    /// Graphviz rank direction (LR, TB, RL, BT).
    #[arg(long, default_value = "LR")]
    pub rankdir: String,

    /// Cut node labels longer than this many characters (0 = never).
    #[arg(long = "max-label", default_value_t = DEFAULT_MAX_LABEL_LEN)]
    pub max_label_len: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_MAX_DEPTH,
            rankdir: "LR".to_string(),
            max_label_len: DEFAULT_MAX_LABEL_LEN,
        }
    }
}

/// Options for the external renderer.
#[derive(Args, Debug, Clone)]
pub struct RenderOptions {
    /// Renderer binary, looked up on PATH unless it contains a path separator.
    #[arg(long, value_name = "BIN", default_value = DEFAULT_RENDERER)]
    pub renderer: String,

    /// Seconds before a renderer invocation is killed.
    #[arg(long = "timeout", value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Write DOT files only; never launch the renderer.
    #[arg(long = "no-render")]
    pub no_render: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            renderer: DEFAULT_RENDERER.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            no_render: false,
        }
    }
}

impl GraphOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn with_rankdir(mut self, rankdir: impl Into<String>) -> Self {
        self.rankdir = rankdir.into();
        self
    }

    pub fn to_build_options(&self) -> BuildOptions {
        BuildOptions::new()
            .with_max_depth(self.depth_limit)
            .with_rankdir(self.rankdir.clone())
            .with_max_label_len(self.max_label_len)
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = renderer.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_no_render(mut self, no_render: bool) -> Self {
        self.no_render = no_render;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_options_map_to_build_options() {
        let build = GraphOptions::new()
            .with_depth_limit(5)
            .with_rankdir("TB")
            .to_build_options();
        assert_eq!(build.max_depth, 5);
        assert_eq!(build.rankdir, "TB");
        assert_eq!(build.max_label_len, DEFAULT_MAX_LABEL_LEN);
    }

    #[test]
    fn render_defaults() {
        let render = RenderOptions::new();
        assert_eq!(render.renderer, "dot");
        assert_eq!(render.timeout(), Duration::from_secs(30));
        assert!(!render.no_render);
    }
}
