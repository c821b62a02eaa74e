//! Transcoding executor backed by the `ffmpeg` binary
//!
//! Spawns the engine with a compiled token list, streams progress reports
//! back through the caller's callback, and supports idempotent mid-flight
//! cancellation by killing the child process.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::compiler::CompiledInstruction;
use crate::domain::errors::EditResult;
use crate::ports::{CancellationHandle, CompleteFn, ExecutePort, ProgressFn};

/// ffmpeg-based [`ExecutePort`] implementation
pub struct FfmpegExecutor {
    binary: PathBuf,
}

impl FfmpegExecutor {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
        }
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutePort for FfmpegExecutor {
    async fn execute(
        &self,
        instruction: &CompiledInstruction,
        on_progress: ProgressFn,
        on_complete: CompleteFn,
    ) -> EditResult<CancellationHandle> {
        // Machine-readable progress on stdout; the compiled tokens carry
        // everything else.
        let mut child = Command::new(&self.binary)
            .args(["-nostats", "-progress", "pipe:1"])
            .args(instruction.tokens())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        debug!(binary = %self.binary.display(), "spawned transcoding engine");

        let handle = CancellationHandle::new();

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if let Some(seconds) = parse_progress_line(&line) {
                        on_progress(seconds);
                    }
                }
            });
        }

        // stderr must be consumed even when nobody cares, or the engine
        // blocks once the pipe buffer fills
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain_lines(stderr));
        }

        let cancel = handle.clone();
        tokio::spawn(async move {
            let success = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => status.success(),
                    Err(error) => {
                        warn!(%error, "failed to reap transcoding engine");
                        false
                    }
                },
                _ = cancel.cancelled() => {
                    if let Err(error) = child.kill().await {
                        warn!(%error, "failed to kill transcoding engine");
                    }
                    let _ = child.wait().await;
                    false
                }
            };
            on_complete(success);
        });

        Ok(handle)
    }
}

async fn drain_lines<R: AsyncRead + Unpin>(stream: R) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        trace!(target: "cutline::ffmpeg", "{}", line);
    }
}

// `-progress` reports elapsed output time as `out_time_us=<micros>`
fn parse_progress_line(line: &str) -> Option<f64> {
    let value = line
        .strip_prefix("out_time_us=")
        .or_else(|| line.strip_prefix("out_time_ms="))?;
    let micros: i64 = value.trim().parse().ok()?;
    Some((micros.max(0) as f64) / 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_drain_keeps_a_noisy_writer_unblocked() {
        // Small in-memory pipe; 64 KiB of output only fits if the drain
        // consumes it concurrently
        let (mut writer, reader) = tokio::io::duplex(1024);
        let drain = tokio::spawn(drain_lines(reader));

        let line = [b'x'; 1023];
        for _ in 0..64 {
            writer.write_all(&line).await.unwrap();
            writer.write_all(b"\n").await.unwrap();
        }
        drop(writer);
        drain.await.unwrap();
    }

    #[test]
    fn test_parse_progress_line() {
        assert_eq!(parse_progress_line("out_time_us=1500000"), Some(1.5));
        assert_eq!(parse_progress_line("out_time_ms=2000000"), Some(2.0));
        assert_eq!(parse_progress_line("frame=42"), None);
        assert_eq!(parse_progress_line("out_time_us=-9223372036854775808"), Some(0.0));
    }
}
