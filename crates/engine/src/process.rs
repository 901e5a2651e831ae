//! Renderer CLI adapter.
//!
//! Drives an externally owned renderer binary as a child process. The
//! binary exposes three subcommands:
//!
//! ```text
//! <cmd> bundle --entry <path> --out <dir>        build a servable bundle
//! <cmd> compositions --bundle <dir>              list compositions (JSON array on stdout)
//! <cmd> render --bundle <dir> --composition <id>
//!        --codec <codec> --output <path>         render one composition
//! ```
//!
//! Input props are passed on stdin as JSON. During a render the binary
//! writes newline-delimited JSON progress events to stdout
//! (`{"renderedFrames": .., "totalFrames": ..}`); lines that do not
//! parse are ignored, matching how the platform tolerates unknown
//! engine messages. stderr is captured into the error on nonzero exit.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::bundle::BundleHandle;
use crate::events::RenderProgress;
use crate::{unique_bundle_dir, Composition, EngineError, RenderEngine, RenderRequest};

/// Marker file every valid bundle directory contains.
const BUNDLE_MANIFEST: &str = "bundle.json";

/// [`RenderEngine`] implementation backed by a renderer CLI.
pub struct ProcessRenderEngine {
    command: PathBuf,
    workdir: PathBuf,
}

impl ProcessRenderEngine {
    /// `command` is the renderer binary; `workdir` receives one
    /// uniquely named bundle directory per build.
    pub fn new(command: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            workdir: workdir.into(),
        }
    }

    /// Hand `props` to the child's stdin and close it.
    ///
    /// The write runs on its own task: a child that starts emitting
    /// output before draining stdin would otherwise deadlock against
    /// the feeding side once both pipes fill.
    fn feed_props(
        child: &mut tokio::process::Child,
        props: &serde_json::Value,
    ) -> Result<(), EngineError> {
        if let Some(mut stdin) = child.stdin.take() {
            let body = serde_json::to_vec(props)
                .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
            tokio::spawn(async move {
                let _ = stdin.write_all(&body).await;
                let _ = stdin.shutdown().await;
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RenderEngine for ProcessRenderEngine {
    async fn build(&self, entry_point: &Path) -> Result<BundleHandle, EngineError> {
        let out_dir = unique_bundle_dir(&self.workdir);
        tokio::fs::create_dir_all(&self.workdir).await?;

        let output = Command::new(&self.command)
            .arg("bundle")
            .arg("--entry")
            .arg(entry_point)
            .arg("--out")
            .arg(&out_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| EngineError::Build(format!("failed to spawn renderer: {e}")))?;

        if !output.status.success() {
            return Err(EngineError::Build(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(BundleHandle::new(out_dir))
    }

    async fn validate(&self, bundle: &BundleHandle) -> bool {
        tokio::fs::try_exists(bundle.dir.join(BUNDLE_MANIFEST))
            .await
            .unwrap_or(false)
    }

    async fn list_compositions(
        &self,
        bundle: &BundleHandle,
        input_props: Option<&serde_json::Value>,
    ) -> Result<Vec<Composition>, EngineError> {
        let mut child = Command::new(&self.command)
            .arg("compositions")
            .arg("--bundle")
            .arg(&bundle.dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::Render(format!("failed to spawn renderer: {e}")))?;

        let props = input_props.cloned().unwrap_or(serde_json::Value::Null);
        Self::feed_props(&mut child, &props)?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| EngineError::Render(e.to_string()))?;

        if !output.status.success() {
            return Err(EngineError::Render(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::InvalidResponse(format!("composition list: {e}")))
    }

    async fn render(
        &self,
        request: RenderRequest<'_>,
        progress: mpsc::Sender<RenderProgress>,
    ) -> Result<(), EngineError> {
        let mut child = Command::new(&self.command)
            .arg("render")
            .arg("--bundle")
            .arg(&request.bundle.dir)
            .arg("--composition")
            .arg(&request.composition.id)
            .arg("--codec")
            .arg(request.codec)
            .arg("--output")
            .arg(request.output_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::Render(format!("failed to spawn renderer: {e}")))?;

        Self::feed_props(&mut child, request.input_props)?;

        let stdout = child.stdout.take().expect("stdout is piped");
        let mut stderr = child.stderr.take().expect("stderr is piped");

        // Forward progress lines as they arrive; the render may run
        // for minutes, so this cannot wait for process exit. stderr is
        // drained concurrently: a chatty renderer can fill the stderr
        // pipe while its progress stream is still open, and a full
        // pipe would stall the child with its stdout held open.
        let forward_progress = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                if let Some(event) = parse_progress_line(&line) {
                    // A dropped receiver just means nobody is watching.
                    let _ = progress.send(event).await;
                } else {
                    tracing::trace!(line, "Ignoring non-progress renderer output");
                }
            }
            Ok::<(), std::io::Error>(())
        };

        let drain_stderr = async {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        };

        let (forwarded, err_buf) = tokio::join!(forward_progress, drain_stderr);
        forwarded?;

        let status = child
            .wait()
            .await
            .map_err(|e| EngineError::Render(e.to_string()))?;

        if !status.success() {
            return Err(EngineError::Render(err_buf.trim().to_string()));
        }
        Ok(())
    }
}

/// Parse one stdout line into a progress event, if it is one.
fn parse_progress_line(line: &str) -> Option<RenderProgress> {
    let line = line.trim();
    if !line.starts_with('{') {
        return None;
    }
    let event: RenderProgress = serde_json::from_str(line).ok()?;
    // An object with neither counter carries no information.
    if event.rendered_frames.is_none() && event.total_frames.is_none() {
        return None;
    }
    Some(event)
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    use super::*;

    /// Write an executable shell script posing as the renderer binary.
    async fn script_renderer(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("renderer.sh");
        tokio::fs::write(&path, format!("#!/bin/sh\n{body}"))
            .await
            .unwrap();
        let mut perms = tokio::fs::metadata(&path).await.unwrap().permissions();
        perms.set_mode(0o755);
        tokio::fs::set_permissions(&path, perms).await.unwrap();
        path
    }

    #[test]
    fn progress_line_parses_both_counters() {
        let event = parse_progress_line(r#"{"renderedFrames": 12, "totalFrames": 240}"#).unwrap();
        assert_eq!(event.rendered_frames, Some(12));
        assert_eq!(event.total_frames, Some(240));
    }

    #[test]
    fn progress_line_allows_partial_counters() {
        let event = parse_progress_line(r#"{"totalFrames": 240}"#).unwrap();
        assert_eq!(event.rendered_frames, None);
        assert_eq!(event.total_frames, Some(240));
    }

    #[test]
    fn non_json_lines_are_ignored() {
        assert!(parse_progress_line("renderer warming up").is_none());
        assert!(parse_progress_line("").is_none());
    }

    #[test]
    fn json_without_counters_is_ignored() {
        assert!(parse_progress_line(r#"{"note": "keyframe"}"#).is_none());
    }

    #[tokio::test]
    async fn validate_requires_manifest_marker() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ProcessRenderEngine::new("renderer", dir.path());
        let bundle = BundleHandle::new(dir.path());

        assert!(!engine.validate(&bundle).await);

        tokio::fs::write(dir.path().join(BUNDLE_MANIFEST), b"{}")
            .await
            .unwrap();
        assert!(engine.validate(&bundle).await);
    }

    /// A renderer that floods stderr past the OS pipe buffer while its
    /// progress stream is still open must not stall the render.
    #[tokio::test]
    async fn render_survives_a_stderr_flood_from_a_healthy_renderer() {
        let dir = tempfile::tempdir().unwrap();
        let script = script_renderer(
            dir.path(),
            concat!(
                "i=0\n",
                "while [ $i -lt 4000 ]; do\n",
                "  echo 'diagnostic output line with enough padding to matter' >&2\n",
                "  i=$((i+1))\n",
                "done\n",
                "echo '{\"renderedFrames\": 10, \"totalFrames\": 10}'\n",
                "exit 0\n",
            ),
        )
        .await;

        let engine = ProcessRenderEngine::new(&script, dir.path());
        let composition = Composition {
            id: "Main".into(),
            duration_in_frames: 10,
            fps: None,
            width: None,
            height: None,
        };
        let bundle = BundleHandle::new(dir.path());
        let output_path = dir.path().join("out.mp4");
        let props = serde_json::Value::Null;
        let (tx, mut rx) = mpsc::channel(8);

        let request = RenderRequest {
            composition: &composition,
            bundle: &bundle,
            codec: "h264",
            input_props: &props,
            output_path: &output_path,
        };

        tokio::time::timeout(Duration::from_secs(10), engine.render(request, tx))
            .await
            .expect("render must not stall on a chatty renderer")
            .unwrap();

        let event = rx.recv().await.expect("progress event must arrive");
        assert_eq!(event.rendered_frames, Some(10));
        assert_eq!(event.total_frames, Some(10));
    }

    /// A failing renderer's stderr still ends up in the error message.
    #[tokio::test]
    async fn failed_render_carries_its_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = script_renderer(
            dir.path(),
            concat!("echo 'codec initialization failed' >&2\n", "exit 1\n"),
        )
        .await;

        let engine = ProcessRenderEngine::new(&script, dir.path());
        let composition = Composition {
            id: "Main".into(),
            duration_in_frames: 10,
            fps: None,
            width: None,
            height: None,
        };
        let bundle = BundleHandle::new(dir.path());
        let output_path = dir.path().join("out.mp4");
        let props = serde_json::Value::Null;
        let (tx, _rx) = mpsc::channel(8);

        let request = RenderRequest {
            composition: &composition,
            bundle: &bundle,
            codec: "h264",
            input_props: &props,
            output_path: &output_path,
        };

        let err = engine.render(request, tx).await.unwrap_err();
        match err {
            EngineError::Render(msg) => assert!(msg.contains("codec initialization failed")),
            other => panic!("expected a render error, got {other:?}"),
        }
    }
}
