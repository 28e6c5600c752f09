//! Subprocess invocation for dependency install and in-place builds
//!
//! Extensions bring their own tooling (an npm-style dependency installer and
//! build script); the orchestrator shells out to it inside the live
//! directory with a timeout, streaming output into the debug log.

use packhost_core::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::process::Command;
use tracing::debug;

/// Run a command line inside a directory, with a timeout
///
/// `argv[0]` is the program, the rest are arguments. stdout is streamed
/// line-by-line into the debug log; stderr is captured for the error
/// message.
pub async fn run_in_dir(argv: &[String], dir: &Path, timeout: Duration) -> Result<()> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::subprocess("empty command line"))?;

    debug!("Running {:?} in {:?}", argv, dir);

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.current_dir(dir);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        Error::subprocess(format!("failed to spawn {}: {}", program, e))
    })?;

    if let Some(stdout) = child.stdout.take() {
        let reader = tokio::io::BufReader::new(stdout);
        let mut lines = reader.lines();

        tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("subprocess: {}", line);
            }
        });
    }

    let stderr = child.stderr.take();

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            return Err(Error::subprocess(format!(
                "failed to wait for {}: {}",
                program, e
            )))
        }
        Err(_) => {
            let _ = child.kill().await;
            return Err(Error::subprocess(format!(
                "{} timed out after {:?}",
                program, timeout
            )));
        }
    };

    if status.success() {
        return Ok(());
    }

    let mut stderr_text = String::new();
    if let Some(stderr) = stderr {
        let mut reader = tokio::io::BufReader::new(stderr);
        use tokio::io::AsyncReadExt;
        let _ = reader.read_to_string(&mut stderr_text).await;
    }

    Err(Error::subprocess(format!(
        "{} exited with {}: {}",
        program,
        status,
        stderr_text.trim()
    )))
}
