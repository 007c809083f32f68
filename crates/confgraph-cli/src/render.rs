//! Renderer invocation: probe for the Graphviz binary once, then run it per
//! source under a wall-clock bound.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use confgraph_core::{Error, Result};

/// How often a running renderer is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Something that turns a description file into an image file.
///
/// The orchestrator checks [`ImageRenderer::is_available`] once per source
/// and never calls [`ImageRenderer::render`] when it is false.
pub trait ImageRenderer {
    /// Name shown in the report (e.g. `dot`).
    fn name(&self) -> &str;

    /// Result of the capability probe taken when the renderer was built.
    fn is_available(&self) -> bool;

    /// Render `description` into `image`.
    fn render(&self, description: &Path, image: &Path) -> Result<()>;
}

/// Outcome of looking up the renderer binary at batch start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererProbe {
    name: String,
    resolved: Option<PathBuf>,
}

impl RendererProbe {
    /// Resolve `name` on the execution search path.
    pub fn detect(name: &str) -> Self {
        let resolved = find_on_path(name);
        match &resolved {
            Some(path) => debug!(name, path = %path.display(), "renderer found"),
            None => warn!(name, "renderer not found on PATH"),
        }
        Self {
            name: name.to_string(),
            resolved,
        }
    }

    /// A probe that reports the renderer as unavailable.
    pub fn disabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            resolved: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolved(&self) -> Option<&Path> {
        self.resolved.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Find an executable named `name` on `PATH`.
///
/// A name containing a path separator is checked directly instead.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    find_in(name, std::env::var_os("PATH"))
}

/// [`find_on_path`] against an explicit `PATH` value.
pub fn find_in(name: &str, path_var: Option<OsString>) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if name.is_empty() {
        return None;
    }
    if candidate.is_absolute() || candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path_var = path_var?;
    std::env::split_paths(&path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| executable_names(name).into_iter().map(move |n| dir.join(n)))
        .find(|path| is_executable(path))
}

fn executable_names(name: &str) -> Vec<String> {
    if cfg!(windows) {
        vec![name.to_string(), format!("{name}.exe")]
    } else {
        vec![name.to_string()]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Graphviz renderer: `<binary> -Tpng <description> -o <image>`.
#[derive(Debug, Clone)]
pub struct DotRenderer {
    probe: RendererProbe,
    timeout: Duration,
    format: String,
}

impl DotRenderer {
    pub fn new(probe: RendererProbe, timeout: Duration) -> Self {
        Self {
            probe,
            timeout,
            format: "png".to_string(),
        }
    }

    /// Argument vector passed to the binary.
    pub fn args(&self, description: &Path, image: &Path) -> Vec<OsString> {
        vec![
            OsString::from(format!("-T{}", self.format)),
            description.as_os_str().to_owned(),
            OsString::from("-o"),
            image.as_os_str().to_owned(),
        ]
    }

    /// Human-readable command line, for logs and the manual-render hint.
    pub fn command_line(&self, description: &Path, image: &Path) -> String {
        let mut parts = vec![self.probe.name().to_string()];
        parts.extend(
            self.args(description, image)
                .iter()
                .map(|a| a.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }

    fn spawn(&self, binary: &Path, description: &Path, image: &Path) -> Result<Child> {
        Command::new(binary)
            .args(self.args(description, image))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => Error::binary_missing(self.probe.name())
                    .with_operation("render::spawn")
                    .set_source(err),
                _ => Error::unexpected(format!(
                    "failed to launch '{}': {err}",
                    self.probe.name()
                ))
                .with_operation("render::spawn")
                .set_source(err),
            })
    }
}

impl ImageRenderer for DotRenderer {
    fn name(&self) -> &str {
        self.probe.name()
    }

    fn is_available(&self) -> bool {
        self.probe.is_available()
    }

    fn render(&self, description: &Path, image: &Path) -> Result<()> {
        let Some(binary) = self.probe.resolved() else {
            return Err(Error::binary_missing(self.probe.name()).with_operation("render::render"));
        };

        // A leftover image from an earlier run must not count as output.
        match std::fs::remove_file(image) {
            Ok(()) => debug!(image = %image.display(), "removed stale image"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(Error::unexpected(format!(
                    "cannot replace '{}': {err}",
                    image.display()
                ))
                .with_operation("render::render")
                .set_source(err));
            }
        }

        info!("Rendering command: {}", self.command_line(description, image));
        let deadline = Instant::now() + self.timeout;
        let mut child = self.spawn(binary, description, image)?;

        // Drain stderr on a helper thread so a chatty renderer cannot block on a full pipe.
        let (stderr_tx, stderr_rx) = mpsc::channel();
        if let Some(mut pipe) = child.stderr.take() {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                let _ = stderr_tx.send(String::from_utf8_lossy(&buf).trim().to_string());
            });
        }

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                // The reader thread is left detached; a killed child may leave
                // descendants holding the pipe open.
                terminate(&mut child);
                return Err(Error::timeout(format!(
                    "'{}' command timed out after {:.1}s",
                    self.probe.name(),
                    self.timeout.as_secs_f64()
                ))
                .with_operation("render::render"));
            }
            Err(err) => {
                terminate(&mut child);
                return Err(Error::unexpected(format!(
                    "failed waiting for '{}': {err}",
                    self.probe.name()
                ))
                .with_operation("render::render")
                .set_source(err));
            }
        };

        let stderr = collect_stderr(&stderr_rx, deadline);

        match status.code() {
            Some(0) if image.is_file() => Ok(()),
            Some(0) => Err(Error::unexpected(format!(
                "'{}' exited successfully but produced no image",
                self.probe.name()
            ))
            .with_operation("render::render")
            .with_context("image", image.display().to_string())),
            Some(code) => Err(Error::non_zero_exit(code, stderr)
                .with_operation("render::render")
                .with_context("binary", self.probe.name().to_string())),
            None => Err(Error::unexpected(format!(
                "'{}' was terminated by a signal",
                self.probe.name()
            ))
            .with_operation("render::render")),
        }
    }
}

/// Poll `child` until it exits or `timeout` elapses. `Ok(None)` means timed out.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
    }
}

/// Wait for the drained stderr until `deadline`.
///
/// A background process spawned by the renderer can keep the pipe open after
/// the renderer itself exits; past the deadline the output is given up.
fn collect_stderr(rx: &Receiver<String>, deadline: Instant) -> String {
    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(stderr) => stderr,
        Err(RecvTimeoutError::Timeout) => {
            warn!("renderer stderr still open at the deadline; output dropped");
            String::new()
        }
        Err(RecvTimeoutError::Disconnected) => String::new(),
    }
}

/// Kill and reap `child`.
fn terminate(child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!(error = %err, "kill failed (child may have exited)");
    }
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn command_line_shape() {
        let renderer = DotRenderer::new(RendererProbe::disabled("dot"), Duration::from_secs(30));
        assert_eq!(
            renderer.command_line(Path::new("out/a.ini.dot"), Path::new("out/a.ini.png")),
            "dot -Tpng out/a.ini.dot -o out/a.ini.png"
        );
    }

    #[test]
    fn disabled_probe_is_unavailable() {
        let probe = RendererProbe::disabled("dot");
        assert!(!probe.is_available());
        assert_eq!(probe.resolved(), None);
    }

    #[test]
    fn unavailable_renderer_does_not_launch() {
        let renderer = DotRenderer::new(RendererProbe::disabled("dot"), Duration::from_secs(1));
        let err = renderer
            .render(Path::new("a.dot"), Path::new("a.png"))
            .unwrap_err();
        assert_eq!(err.kind(), confgraph_core::ErrorKind::BinaryMissing);
    }

    #[test]
    fn find_in_empty_path() {
        assert_eq!(find_in("dot", None), None);
        assert_eq!(find_in("", Some(OsString::from("/bin"))), None);
    }

    #[cfg(unix)]
    #[test]
    fn find_in_searches_directories_in_order() {
        use std::os::unix::fs::PermissionsExt;

        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let not_exec = first.path().join("dot");
        fs::write(&not_exec, "").unwrap();
        let exec = second.path().join("dot");
        fs::write(&exec, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&exec, fs::Permissions::from_mode(0o755)).unwrap();

        let path_var = std::env::join_paths([first.path(), second.path()]).unwrap();
        assert_eq!(find_in("dot", Some(path_var.clone())), Some(exec.clone()));
        assert_eq!(find_in("neato", Some(path_var)), None);

        let direct = exec.display().to_string();
        assert_eq!(find_in(&direct, None), Some(exec));
        assert_eq!(find_in(&not_exec.display().to_string(), None), None);
    }
}
