// src/exec/command.rs

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Run `cmd` through the platform shell as a stdin -> stdout filter.
///
/// `input` is written to the child's stdin, which is then closed; the
/// child's stdout is returned. A non-zero exit is an error carrying the
/// child's stderr.
pub async fn run_filter(cmd: &str, input: &[u8], cwd: &Path) -> Result<Vec<u8>> {
    // Build a shell command appropriate for the platform.
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning filter command '{cmd}'"))?;

    let stdin = child.stdin.take();
    let payload = input.to_vec();

    // Feed stdin concurrently so a child that writes before reading all of
    // its input cannot deadlock against us.
    let writer = tokio::spawn(async move {
        let Some(mut stdin) = stdin else {
            return Ok(());
        };
        let res = match stdin.write_all(&payload).await {
            Ok(()) => stdin.shutdown().await,
            Err(e) => Err(e),
        };
        match res {
            // The child may legitimately exit without reading everything.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    });

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for filter command '{cmd}'"))?;

    writer
        .await
        .context("stdin writer task stopped")?
        .with_context(|| format!("writing input to filter command '{cmd}'"))?;

    let code = output.status.code().unwrap_or(-1);
    debug!(cmd, exit_code = code, bytes = output.stdout.len(), "filter command exited");

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "filter command '{cmd}' exited with code {code}: {}",
            stderr.trim()
        );
    }

    Ok(output.stdout)
}
