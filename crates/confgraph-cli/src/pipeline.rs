//! Core processing pipeline: discover → parse → describe → write → render.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, info_span, warn};

use confgraph_core::{SourcePath, parse_config};
use confgraph_dot::{BuildOptions, build_description_with_options};

use crate::artifact::{ArtifactPaths, write_description};
use crate::render::ImageRenderer;
use crate::report::{BatchReport, SkipReason, SourceReport, Stage, StageOutcome};

/// Fixed inputs shared by every source in a batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchContext<'a> {
    pub root: &'a Path,
    pub output_dir: &'a Path,
    pub build: &'a BuildOptions,
}

/// Process every source in order.
///
/// A failure or skip at any stage abandons the remaining stages for that
/// source only; the batch always runs to completion.
pub fn process_sources<R>(sources: &[SourcePath], ctx: &BatchContext<'_>, renderer: &R) -> BatchReport
where
    R: ImageRenderer + ?Sized,
{
    let batch_start = Instant::now();
    let available = renderer.is_available();
    let mut report = BatchReport::new(ctx.root, ctx.output_dir, renderer.name(), available);
    if !available {
        warn!(renderer = renderer.name(), "renderer unavailable; images will not be rendered");
    }

    // Artifact names are derived from file names alone, so two sources with
    // the same name write the same files. The later one wins.
    let mut claimed: HashMap<String, PathBuf> = HashMap::new();

    for source in sources {
        if let Some(previous) = claimed.insert(source.name().to_string(), source.path().to_path_buf())
            && previous != source.path()
        {
            warn!(name = source.name(), "artifact name collision; later source overwrites");
            report.note(format!(
                "'{}' and '{}' share the file name '{}'; artifacts of the latter overwrite the former",
                previous.display(),
                source.path().display(),
                source.name()
            ));
        }

        report.push(process_source(source, ctx, renderer));
    }

    info!(
        "Batch: {:.2}s ({} sources, {} rendered, {} failed)",
        batch_start.elapsed().as_secs_f64(),
        report.sources().len(),
        report.rendered_count(),
        report.failed_count()
    );
    report
}

/// Run every stage for one source, stopping at the first that does not succeed.
pub fn process_source<R>(source: &SourcePath, ctx: &BatchContext<'_>, renderer: &R) -> SourceReport
where
    R: ImageRenderer + ?Sized,
{
    let _span = info_span!("source", name = source.name()).entered();
    let mut report = SourceReport::new(source, ctx.root);

    // 1. Discovery: the file may have vanished since enumeration
    if !source.is_file() {
        info!(path = %source.path().display(), "source not found, skipping");
        report.record(Stage::Discovery, StageOutcome::Skipped(SkipReason::SourceMissing));
        return report;
    }
    report.record(Stage::Discovery, StageOutcome::Success);

    // 2. Parse
    let Some(tree) = report.track(Stage::Parse, parse_config(source.path())) else {
        return report;
    };

    // 3. Describe
    let Some(description) = report.track(
        Stage::Describe,
        build_description_with_options(&tree, source.name(), ctx.build),
    ) else {
        return report;
    };
    drop(tree);

    // 4. Write
    let paths = ArtifactPaths::for_source(ctx.output_dir, source);
    report.artifacts = Some(paths.clone());
    if report
        .track(Stage::Write, write_description(&description, &paths.description))
        .is_none()
    {
        return report;
    }

    // 5. Render
    if !renderer.is_available() {
        report.record(Stage::Render, StageOutcome::Skipped(SkipReason::RendererUnavailable));
        return report;
    }
    report.track(Stage::Render, renderer.render(&paths.description, &paths.image));
    report
}
