//! Graph description module producing DOT output from a configuration tree.
//!
//! A root node carries the graph title. Every mapping key becomes a node
//! hanging off its parent; scalar values are leaves labeled `key = value`,
//! and sequence items are labeled by their index (`[0]`, `[1]`, ...).
//!
//! # Module Structure
//!
//! - [`dot`]: DOT format utilities and the [`DotBuilder`]

mod dot;

use tracing::debug;

use confgraph_core::ConfigValue;
use confgraph_error::{Error, ErrorKind, Result};

pub use dot::{DotBuilder, escape_label, graph_id, sanitize_id};

use dot::{shape_for_value, truncate_label};

/// Default nesting limit; deeper trees are rejected instead of recursing further.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum label length in characters.
pub const DEFAULT_MAX_LABEL_LEN: usize = 80;

/// Options controlling the generated description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum container nesting below the root.
    pub max_depth: usize,
    /// Graphviz `rankdir` (`LR`, `TB`, ...).
    pub rankdir: String,
    /// Longer labels are cut; 0 disables the cut.
    pub max_label_len: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            rankdir: "LR".to_string(),
            max_label_len: DEFAULT_MAX_LABEL_LEN,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_rankdir(mut self, rankdir: impl Into<String>) -> Self {
        self.rankdir = rankdir.into();
        self
    }

    pub fn with_max_label_len(mut self, max_label_len: usize) -> Self {
        self.max_label_len = max_label_len;
        self
    }
}

/// DOT text for one configuration, tagged with its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphDescription {
    pub title: String,
    pub text: String,
}

impl GraphDescription {
    /// Number of `->` edges in the description.
    pub fn edge_count(&self) -> usize {
        self.text.lines().filter(|l| l.contains(" -> ")).count()
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Build the DOT description of `tree` titled `title` with default options.
pub fn build_description(tree: &ConfigValue, title: &str) -> Result<GraphDescription> {
    build_description_with_options(tree, title, &BuildOptions::default())
}

/// Build the DOT description of `tree` with custom options.
///
/// Output is a pure function of the inputs. A tree nested deeper than
/// `options.max_depth` fails with `Unexpected`.
pub fn build_description_with_options(
    tree: &ConfigValue,
    title: &str,
    options: &BuildOptions,
) -> Result<GraphDescription> {
    let mut builder = DotBuilder::new(title);
    builder
        .attr("label", title)
        .attr("labelloc", "t")
        .attr("rankdir", &options.rankdir)
        .node_style(r##"shape=box, style="rounded,filled", fillcolor="#f0f0f0", fontname="Helvetica""##)
        .edge_style(r##"color="#888888", arrowsize=0.7"##)
        .blank();

    let mut walker = TreeWalker {
        builder,
        options,
        next_id: 0,
    };
    let root = walker.alloc_id();
    walker.builder.node_full(
        &root,
        &[("label", title), ("shape", "doubleoctagon"), ("fillcolor", "#d0e0ff")],
    );

    match tree {
        ConfigValue::Mapping(_) | ConfigValue::Sequence(_) => walker.children(&root, tree, 1)?,
        scalar => {
            let label = walker.leaf_label(None, scalar);
            walker.leaf(&root, &label);
        }
    }

    let nodes = walker.next_id;
    let text = walker.builder.build();
    debug!(title, nodes, bytes = text.len(), "built graph description");
    Ok(GraphDescription {
        title: title.to_string(),
        text,
    })
}

// ============================================================================
// Tree walk
// ============================================================================

struct TreeWalker<'a> {
    builder: DotBuilder,
    options: &'a BuildOptions,
    next_id: usize,
}

impl TreeWalker<'_> {
    fn alloc_id(&mut self) -> String {
        let id = format!("n{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Emit the children of a container whose node id is `parent`.
    fn children(&mut self, parent: &str, value: &ConfigValue, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(Error::new(
                ErrorKind::Unexpected,
                format!(
                    "configuration nesting exceeds the limit of {} levels",
                    self.options.max_depth
                ),
            )
            .with_operation("dot::build_description")
            .with_context("depth", depth.to_string()));
        }

        match value {
            ConfigValue::Mapping(entries) => {
                for (key, child) in entries {
                    self.entry(parent, key, child, depth)?;
                }
            }
            ConfigValue::Sequence(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.entry(parent, &format!("[{index}]"), child, depth)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn entry(&mut self, parent: &str, key: &str, value: &ConfigValue, depth: usize) -> Result<()> {
        if value.is_container() && !value.is_empty_container() {
            let id = self.alloc_id();
            let label = truncate_label(key, self.options.max_label_len);
            self.builder
                .node_full(&id, &[("label", label.as_str()), ("shape", shape_for_value(value))]);
            self.builder.edge(parent, &id);
            return self.children(&id, value, depth + 1);
        }

        let label = self.leaf_label(Some(key), value);
        self.leaf(parent, &label);
        Ok(())
    }

    fn leaf_label(&self, key: Option<&str>, value: &ConfigValue) -> String {
        let text = match key {
            Some(key) => format!("{key} = {value}"),
            None => value.to_string(),
        };
        truncate_label(&text, self.options.max_label_len)
    }

    fn leaf(&mut self, parent: &str, label: &str) {
        let id = self.alloc_id();
        self.builder.node_full(
            &id,
            &[("label", label), ("shape", "plaintext"), ("style", "")],
        );
        self.builder.edge(parent, &id);
    }
}
