//! Subprocess contract of the Graphviz renderer, exercised with stand-in scripts.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use confgraph::{DotRenderer, ImageRenderer, RendererProbe};
use confgraph_core::ErrorKind;
use serial_test::serial;
use tempfile::tempdir;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

fn renderer_for(script: &Path, timeout: Duration) -> DotRenderer {
    let probe = RendererProbe::detect(&script.display().to_string());
    assert!(probe.is_available(), "probe should resolve {}", script.display());
    DotRenderer::new(probe, timeout)
}

fn description(dir: &Path) -> PathBuf {
    let path = dir.join("a.ini.dot");
    fs::write(&path, "digraph a_ini {\n  n0[label=\"a.ini\"];\n}\n").expect("write dot");
    path
}

#[test]
#[serial]
fn success_produces_non_empty_image() {
    let dir = tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "dot",
        r#"[ "$1" = "-Tpng" ] && [ "$3" = "-o" ] || exit 9
cat "$2" > "$4""#,
    );
    let renderer = renderer_for(&script, Duration::from_secs(10));
    let image = dir.path().join("a.ini.png");

    renderer.render(&description(dir.path()), &image).expect("render");
    assert!(fs::metadata(&image).unwrap().len() > 0);
}

#[test]
#[serial]
fn missing_description_is_non_zero_exit_with_stderr() {
    let dir = tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "dot",
        r#"[ -f "$2" ] || { echo "Error: cannot open $2" >&2; exit 2; }
printf x > "$4""#,
    );
    let renderer = renderer_for(&script, Duration::from_secs(10));

    let err = renderer
        .render(&dir.path().join("missing.dot"), &dir.path().join("missing.png"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NonZeroExit);
    assert_eq!(err.context_value("code"), Some("2"));
    assert!(err.message().contains("cannot open"), "{err}");
}

#[test]
#[serial]
fn binary_removed_after_probe_is_binary_missing() {
    let dir = tempdir().unwrap();
    let script = write_script(dir.path(), "dot", "exit 0");
    let renderer = renderer_for(&script, Duration::from_secs(10));
    fs::remove_file(&script).unwrap();

    let err = renderer
        .render(&description(dir.path()), &dir.path().join("a.ini.png"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BinaryMissing);
}

#[test]
#[serial]
fn slow_renderer_is_killed_at_the_timeout() {
    let dir = tempdir().unwrap();
    let script = write_script(dir.path(), "dot", "exec sleep 30");
    let renderer = renderer_for(&script, Duration::from_millis(300));

    let start = Instant::now();
    let err = renderer
        .render(&description(dir.path()), &dir.path().join("a.ini.png"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
#[serial]
fn clean_exit_without_image_is_unexpected() {
    let dir = tempdir().unwrap();
    let script = write_script(dir.path(), "dot", "exit 0");
    let renderer = renderer_for(&script, Duration::from_secs(10));
    let image = dir.path().join("a.ini.png");
    fs::write(&image, "image from an earlier run").unwrap();

    let err = renderer.render(&description(dir.path()), &image).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert!(!image.exists());
}

#[test]
#[serial]
fn large_stderr_does_not_block() {
    let dir = tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "dot",
        r#"i=0
while [ $i -lt 2000 ]; do echo "warning: line $i of noisy renderer output" >&2; i=$((i+1)); done
exit 1"#,
    );
    let renderer = renderer_for(&script, Duration::from_secs(20));

    let err = renderer
        .render(&description(dir.path()), &dir.path().join("a.ini.png"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NonZeroExit);
    assert!(err.message().contains("line 1999"));
}

#[test]
#[serial]
fn background_child_holding_stderr_does_not_outlive_the_timeout() {
    let dir = tempdir().unwrap();
    let script = write_script(dir.path(), "dot", "sleep 6 &\necho boom >&2\nexit 1");
    let renderer = renderer_for(&script, Duration::from_secs(1));

    let start = Instant::now();
    let err = renderer
        .render(&description(dir.path()), &dir.path().join("a.ini.png"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NonZeroExit);
    assert_eq!(err.context_value("code"), Some("1"));
    assert!(start.elapsed() < Duration::from_secs(4), "took {:?}", start.elapsed());
}

/// Runs against a real Graphviz install when one is on PATH.
#[test]
#[serial]
fn real_graphviz_when_installed() {
    let probe = RendererProbe::detect("dot");
    if !probe.is_available() {
        eprintln!("graphviz not installed; skipping");
        return;
    }
    let dir = tempdir().unwrap();
    let renderer = DotRenderer::new(probe, Duration::from_secs(30));
    let image = dir.path().join("a.ini.png");

    renderer.render(&description(dir.path()), &image).expect("dot render");
    assert!(fs::metadata(&image).unwrap().len() > 0);

    let err = renderer
        .render(&dir.path().join("missing.dot"), &dir.path().join("m.png"))
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::NonZeroExit | ErrorKind::BinaryMissing
    ));
}
