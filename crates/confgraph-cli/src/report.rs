//! Per-source stage outcomes and the batch summary.

use std::fmt;
use std::path::{Path, PathBuf};

use confgraph_core::{Error, ErrorKind, SourcePath};

use crate::artifact::ArtifactPaths;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Discovery,
    Parse,
    Describe,
    Write,
    Render,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Discovery => "Discovery",
            Stage::Parse => "Parsing",
            Stage::Describe => "DOT Generation",
            Stage::Write => "DOT Save",
            Stage::Render => "Rendering",
        }
    }
}

/// Why a stage did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    SourceMissing,
    RendererUnavailable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SourceMissing => write!(f, "source file not found"),
            SkipReason::RendererUnavailable => write!(f, "renderer unavailable"),
        }
    }
}

/// Result of one stage for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Success,
    Skipped(SkipReason),
    Failed { kind: ErrorKind, detail: String },
}

impl StageOutcome {
    pub fn from_error(err: &Error) -> Self {
        let detail = match err.kind() {
            ErrorKind::NonZeroExit => {
                let code = err.context_value("code").unwrap_or("?");
                let binary = err.context_value("binary").unwrap_or("renderer");
                if err.message().is_empty() {
                    format!("'{binary}' command exited with code {code}")
                } else {
                    format!(
                        "'{binary}' command exited with code {code}\n  stderr:\n{}",
                        err.message()
                    )
                }
            }
            _ => err.message().to_string(),
        };
        StageOutcome::Failed {
            kind: err.kind(),
            detail,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StageOutcome::Success)
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            StageOutcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Outcomes recorded for a single source.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub name: String,
    pub display: String,
    pub artifacts: Option<ArtifactPaths>,
    stages: Vec<(Stage, StageOutcome)>,
}

impl SourceReport {
    pub fn new(source: &SourcePath, root: &Path) -> Self {
        Self {
            name: source.name().to_string(),
            display: source.relative_to(root),
            artifacts: None,
            stages: Vec::new(),
        }
    }

    /// Append an outcome. Stages are recorded in execution order.
    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        debug_assert!(
            self.stages.last().is_none_or(|(s, o)| *s < stage && o.is_success()),
            "stage recorded out of order or after a terminal outcome"
        );
        self.stages.push((stage, outcome));
    }

    /// Record the result of a stage; `None` means the source is abandoned.
    pub fn track<T>(&mut self, stage: Stage, result: confgraph_core::Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.record(stage, StageOutcome::Success);
                Some(value)
            }
            Err(err) => {
                tracing::warn!(source = %self.display, stage = stage.label(), error = %err, "stage failed");
                self.record(stage, StageOutcome::from_error(&err));
                None
            }
        }
    }

    pub fn stages(&self) -> &[(Stage, StageOutcome)] {
        &self.stages
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages.iter().find(|(s, _)| *s == stage).map(|(_, o)| o)
    }

    /// The last stage that succeeded, if any.
    pub fn last_success(&self) -> Option<Stage> {
        self.stages
            .iter()
            .take_while(|(_, o)| o.is_success())
            .last()
            .map(|(s, _)| *s)
    }

    /// The terminal outcome: the first non-success, or the last success.
    pub fn final_outcome(&self) -> Option<(Stage, &StageOutcome)> {
        self.stages
            .iter()
            .find(|(_, o)| !o.is_success())
            .or_else(|| self.stages.last())
            .map(|(s, o)| (*s, o))
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self.final_outcome(), Some((Stage::Render, StageOutcome::Success)))
    }

    pub fn is_failed(&self) -> bool {
        self.stages
            .iter()
            .any(|(_, o)| matches!(o, StageOutcome::Failed { .. }))
    }

    pub fn is_source_missing(&self) -> bool {
        matches!(
            self.outcome(Stage::Discovery),
            Some(StageOutcome::Skipped(SkipReason::SourceMissing))
        )
    }

    fn write_lines(&self, f: &mut fmt::Formatter<'_>, root: &Path) -> fmt::Result {
        if self.is_source_missing() {
            return writeln!(f, "\nSkipping: Source file not found - {}", self.display);
        }

        writeln!(f, "\nProcessing: {}", self.display)?;
        for (stage, outcome) in &self.stages {
            match (stage, outcome) {
                (Stage::Discovery, StageOutcome::Success) => {}
                (Stage::Write, StageOutcome::Success) => {
                    if let Some(paths) = &self.artifacts {
                        writeln!(f, "  DOT Saved: {}", relative(&paths.description, root))?;
                    }
                }
                (Stage::Render, StageOutcome::Success) => {
                    if let Some(paths) = &self.artifacts {
                        writeln!(f, "  Image Rendered: {}", relative(&paths.image, root))?;
                    }
                }
                (stage, StageOutcome::Success) => writeln!(f, "  {}: OK", stage.label())?,
                (stage, StageOutcome::Skipped(reason)) => {
                    writeln!(f, "  {}: SKIPPED ({reason})", stage.label())?
                }
                (stage, StageOutcome::Failed { kind, detail }) => {
                    writeln!(f, "  {}: FAILED - {kind}: {detail}", stage.label())?;
                    if let Some(remedy) = kind.remedy() {
                        writeln!(f, "         ({remedy})")?;
                    }
                    let last = self.last_success().map_or("none", |s| s.label());
                    writeln!(f, "  Last completed stage: {last}; remaining stages not run")?;
                }
            }
        }
        Ok(())
    }
}

/// Everything that happened in one run. Built once, printed at the end.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub root: PathBuf,
    pub output_dir: PathBuf,
    pub renderer: String,
    pub renderer_available: bool,
    pub notes: Vec<String>,
    sources: Vec<SourceReport>,
}

impl BatchReport {
    pub fn new(root: &Path, output_dir: &Path, renderer: &str, renderer_available: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            renderer: renderer.to_string(),
            renderer_available,
            notes: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn push(&mut self, source: SourceReport) {
        self.sources.push(source);
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn sources(&self) -> &[SourceReport] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Reports for every source with this file name, in processing order.
    pub fn by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SourceReport> + 'a {
        self.sources.iter().filter(move |s| s.name == name)
    }

    pub fn rendered_count(&self) -> usize {
        self.sources.iter().filter(|s| s.is_rendered()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.sources.iter().filter(|s| s.is_failed()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.sources.iter().filter(|s| s.is_source_missing()).count()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Processing Configuration Files ---")?;
        if !self.renderer_available {
            writeln!(f, "WARNING: '{}' renderer not found.", self.renderer)?;
            writeln!(
                f,
                "         DOT files will be generated, but images cannot be rendered automatically."
            )?;
        }

        for source in &self.sources {
            source.write_lines(f, &self.root)?;
        }

        for note in &self.notes {
            writeln!(f, "\nNOTE: {note}")?;
        }

        writeln!(f, "\n--- Finished ---")?;
        writeln!(
            f,
            "{} sources: {} rendered, {} failed, {} not found",
            self.sources.len(),
            self.rendered_count(),
            self.failed_count(),
            self.missing_count()
        )?;
        writeln!(
            f,
            "Rendering available: {}",
            if self.renderer_available { "yes" } else { "no" }
        )?;
        writeln!(
            f,
            "Generated files are in the '{}/' directory.",
            relative(&self.output_dir, &self.root)
        )?;
        if !self.renderer_available {
            writeln!(
                f,
                "Install Graphviz and run '{} -Tpng <filename>.dot -o <filename>.png' to render images.",
                self.renderer
            )?;
        }
        Ok(())
    }
}

fn relative(path: &Path, root: &Path) -> String {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    path.strip_prefix(&root).unwrap_or(path).display().to_string()
}
