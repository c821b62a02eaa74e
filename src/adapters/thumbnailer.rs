//! Single-frame thumbnail renderer backed by the `ffmpeg` binary

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::errors::{EditError, EditResult};
use crate::domain::model::TimeInterval;
use crate::ports::ThumbnailPort;

const THUMBNAIL_HEIGHT: u32 = 80;

/// ffmpeg-based [`ThumbnailPort`] implementation emitting JPEG bytes
pub struct FfmpegThumbnailer {
    binary: PathBuf,
}

impl FfmpegThumbnailer {
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

impl Default for FfmpegThumbnailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThumbnailPort for FfmpegThumbnailer {
    async fn render(&self, path: &Path, timestamp: TimeInterval) -> EditResult<Vec<u8>> {
        let output = Command::new(&self.binary)
            .arg("-ss")
            .arg(format!("{:.6}", timestamp.as_seconds()))
            .arg("-i")
            .arg(path)
            .args(["-frames:v", "1"])
            .args(["-vf", &format!("scale=-2:{}", THUMBNAIL_HEIGHT)])
            .args(["-f", "image2", "-c:v", "mjpeg", "pipe:1"])
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() || output.stdout.is_empty() {
            return Err(EditError::Execution {
                message: format!(
                    "thumbnail render at {:.3}s failed: {}",
                    timestamp.as_seconds(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(output.stdout)
    }
}
