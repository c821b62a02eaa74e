//! Media probe adapter backed by the `ffprobe` binary
//!
//! Runs `ffprobe -print_format json` and maps the report into a
//! [`MediaProbe`]. Fields the probe cannot determine stay absent; only a
//! failed or unparseable invocation is an error.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::{EditError, EditResult};
use crate::domain::model::{TimeInterval, TrackDescriptor};
use crate::ports::{MediaProbe, ProbePort};

/// ffprobe-based [`ProbePort`] implementation
pub struct FfprobeAdapter {
    binary: PathBuf,
}

impl FfprobeAdapter {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("ffprobe"),
        }
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfprobeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe(&self, path: &Path) -> EditResult<MediaProbe> {
        let output = Command::new(&self.binary)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(EditError::Probe {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report: FfprobeOutput =
            serde_json::from_slice(&output.stdout).map_err(|e| EditError::Probe {
                message: format!("unparseable ffprobe output: {}", e),
            })?;

        debug!(path = %path.display(), "probed media file");
        Ok(report.into_media_probe())
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    streams: Option<Vec<FfprobeStream>>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    start_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: Option<i32>,
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    bit_rate: Option<String>,
    tags: Option<FfprobeTags>,
}

#[derive(Debug, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
    title: Option<String>,
}

impl FfprobeOutput {
    fn into_media_probe(self) -> MediaProbe {
        let mut probe = MediaProbe::default();

        if let Some(format) = self.format {
            probe.duration = format
                .duration
                .and_then(|d| d.parse::<f64>().ok())
                .map(TimeInterval::from_seconds);
            probe.start_offset = format
                .start_time
                .and_then(|s| s.parse::<f64>().ok())
                .map(TimeInterval::from_seconds);
        }

        for stream in self.streams.unwrap_or_default() {
            match stream.codec_type.as_deref() {
                Some("video") => {
                    if probe.resolution.is_none() {
                        if let (Some(w), Some(h)) = (stream.width, stream.height) {
                            probe.resolution = Some((w, h));
                        }
                    }
                    if probe.video_bitrate.is_none() {
                        probe.video_bitrate =
                            stream.bit_rate.as_deref().and_then(|b| b.parse().ok());
                    }
                }
                Some("audio") => {
                    let sub_index = probe.audio_tracks.len() as i32;
                    probe.audio_tracks.push(descriptor(sub_index, stream));
                }
                Some("subtitle") => {
                    let sub_index = probe.subtitle_tracks.len() as i32;
                    probe.subtitle_tracks.push(descriptor(sub_index, stream));
                }
                _ => {}
            }
        }
        probe
    }
}

// Sub-track index within its own stream type becomes the stream id; the
// container-wide index is kept as the title id.
fn descriptor(sub_index: i32, stream: FfprobeStream) -> TrackDescriptor {
    let tags = stream.tags.unwrap_or(FfprobeTags {
        language: None,
        title: None,
    });
    TrackDescriptor {
        stream_id: sub_index,
        title_id: stream.index.unwrap_or(sub_index),
        title: tags.title,
        language: tags.language,
        bitrate: stream.bit_rate.and_then(|b| b.parse::<f64>().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_maps_tracks_and_format() {
        let json = r#"{
            "format": {"duration": "120.5", "start_time": "0.023"},
            "streams": [
                {"index": 0, "codec_type": "video", "width": 1920, "height": 1080, "bit_rate": "4000000"},
                {"index": 1, "codec_type": "audio", "bit_rate": "192000", "tags": {"language": "eng"}},
                {"index": 2, "codec_type": "audio", "tags": {"title": "Commentary"}},
                {"index": 3, "codec_type": "subtitle", "tags": {"language": "fre"}}
            ]
        }"#;
        let report: FfprobeOutput = serde_json::from_str(json).unwrap();
        let probe = report.into_media_probe();

        assert_eq!(probe.duration.unwrap().as_seconds(), 120.5);
        assert_eq!(probe.start_offset.unwrap().as_seconds(), 0.023);
        assert_eq!(probe.resolution, Some((1920, 1080)));
        assert_eq!(probe.video_bitrate, Some(4_000_000));

        assert_eq!(probe.audio_tracks.len(), 2);
        assert_eq!(probe.audio_tracks[0].stream_id, 0);
        assert_eq!(probe.audio_tracks[0].language.as_deref(), Some("eng"));
        assert_eq!(probe.audio_tracks[1].stream_id, 1);
        assert_eq!(probe.audio_tracks[1].title.as_deref(), Some("Commentary"));

        assert_eq!(probe.subtitle_tracks.len(), 1);
        assert_eq!(probe.subtitle_tracks[0].title_id, 3);
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let report: FfprobeOutput = serde_json::from_str("{}").unwrap();
        let probe = report.into_media_probe();
        assert!(probe.duration.is_none());
        assert!(probe.resolution.is_none());
        assert!(probe.audio_tracks.is_empty());
    }
}
