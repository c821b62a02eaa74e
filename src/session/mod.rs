//! Edit session interactor
//!
//! Wires the probe, timeline engine, clip set, and export executor
//! together. One session edits one loaded source at a time; loading a new
//! source resets the trim window and the clip list.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::clips::{ClipId, ClipSet};
use crate::compiler::{self, CompiledInstruction};
use crate::domain::errors::{EditError, EditResult};
use crate::domain::model::{
    ContainerFormat, ExportSpec, MediaSource, ResolutionSpec, TrackDescriptor,
};
use crate::ports::{CancellationHandle, ExecutePort, ProbePort};
use crate::relay::Relay;
use crate::timeline::TimelineEngine;

/// User-adjustable knobs for one export attempt
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub speed: f64,
    pub resolution: Option<ResolutionSpec>,
    pub custom_size: Option<(u32, u32)>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub frame_rate: Option<f64>,
    pub container: ContainerFormat,
    pub output_path: std::path::PathBuf,
}

/// Event stream of one running export
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportEvent {
    /// Fraction of the speed-adjusted output duration written so far
    Progress { fraction: f64, elapsed_seconds: f64 },
    Completed { success: bool },
}

/// A started export: the cancellation handle plus the funneled event stream
pub struct ExportJob {
    pub handle: CancellationHandle,
    pub events: mpsc::UnboundedReceiver<ExportEvent>,
}

/// The central interactor owning all edit state
pub struct EditSession {
    probe: Arc<dyn ProbePort>,
    executor: Arc<dyn ExecutePort>,
    engine: TimelineEngine,
    clips: ClipSet,
    source: Option<MediaSource>,
    audio_tracks: Vec<TrackDescriptor>,
    subtitle_tracks: Vec<TrackDescriptor>,
    selected_audio: TrackDescriptor,
    exporting: Arc<AtomicBool>,
    events: Relay<ExportEvent>,
}

impl EditSession {
    pub fn new(
        probe: Arc<dyn ProbePort>,
        executor: Arc<dyn ExecutePort>,
        viewport_width: f64,
    ) -> Self {
        Self {
            probe,
            executor,
            engine: TimelineEngine::new(viewport_width),
            clips: ClipSet::new(),
            source: None,
            audio_tracks: Vec::new(),
            subtitle_tracks: Vec::new(),
            selected_audio: TrackDescriptor::disabled(),
            exporting: Arc::new(AtomicBool::new(false)),
            events: Relay::new(),
        }
    }

    /// Last-value-cached export event feed. A subscriber attached mid-export
    /// immediately sees the most recent event.
    pub fn events(&self) -> &Relay<ExportEvent> {
        &self.events
    }

    /// Probe and load a source file, seeding the timeline limits.
    ///
    /// A source whose duration cannot be determined is refused; every other
    /// probe field is optional.
    pub async fn load_media(&mut self, path: &Path) -> EditResult<()> {
        let report = self.probe.probe(path).await?;
        let duration = report.duration.ok_or_else(|| EditError::Probe {
            message: format!("no duration reported for {}", path.display()),
        })?;

        let mut source = MediaSource::new(path, duration);
        if let Some(offset) = report.start_offset {
            source.start_offset = offset;
        }
        source.video_bitrate = report.video_bitrate;

        self.engine.set_media(source.full_range());
        self.clips.clear();
        self.audio_tracks = report.audio_tracks;
        self.subtitle_tracks = report.subtitle_tracks;
        // First real track wins by default; no track means audio stays off
        self.selected_audio = self
            .audio_tracks
            .first()
            .cloned()
            .unwrap_or_else(TrackDescriptor::disabled);

        info!(path = %path.display(), duration = %duration, "media loaded");
        self.source = Some(source);
        Ok(())
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    pub fn engine(&self) -> &TimelineEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TimelineEngine {
        &mut self.engine
    }

    pub fn clips(&self) -> &ClipSet {
        &self.clips
    }

    pub fn clips_mut(&mut self) -> &mut ClipSet {
        &mut self.clips
    }

    /// Queue the current trim window as a clip
    pub fn add_clip_from_trim(&mut self) -> EditResult<ClipId> {
        let trim = self.engine.trim_range();
        let limits = self
            .source
            .as_ref()
            .map(|s| s.full_range())
            .ok_or(EditError::EmptyExport)?;
        self.clips.add_from_trim(&trim, &limits)
    }

    /// The audio choices presented to the user: the disabled sentinel first,
    /// then every probed track.
    pub fn available_audio_tracks(&self) -> Vec<TrackDescriptor> {
        let mut tracks = vec![TrackDescriptor::disabled()];
        tracks.extend(self.audio_tracks.iter().cloned());
        tracks
    }

    pub fn subtitle_tracks(&self) -> &[TrackDescriptor] {
        &self.subtitle_tracks
    }

    pub fn selected_audio(&self) -> &TrackDescriptor {
        &self.selected_audio
    }

    /// Select an audio track by its index into [`available_audio_tracks`].
    /// Out-of-range indices recover by selecting the disabled sentinel.
    pub fn select_audio_track(&mut self, index: usize) {
        let tracks = self.available_audio_tracks();
        self.selected_audio = match tracks.get(index) {
            Some(track) => track.clone(),
            None => {
                let reason = EditError::UnsupportedTrackIndex {
                    index,
                    available: tracks.len(),
                };
                debug!(%reason, "audio selection clamped to disabled");
                TrackDescriptor::disabled()
            }
        };
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    /// Assemble the declarative spec for the current edit state
    pub fn build_spec(&self, options: &ExportOptions) -> EditResult<ExportSpec> {
        let source = self.source.clone().ok_or(EditError::EmptyExport)?;

        // With no queued clips the trim window itself is the selection
        let clips = if self.clips.is_empty() {
            vec![self.engine.current_clip()?]
        } else {
            self.clips.clips()
        };

        let (default_video, default_audio) = options.container.default_codecs();
        ExportSpec::new(
            source,
            clips,
            options.speed,
            options.resolution.clone(),
            options.custom_size,
            options
                .video_codec
                .clone()
                .or_else(|| default_video.map(String::from)),
            options
                .audio_codec
                .clone()
                .or_else(|| default_audio.map(String::from)),
            options.frame_rate,
            vec![self.selected_audio.clone()],
            options.output_path.clone(),
            options.container,
        )
    }

    /// Compile the current edit state without executing it
    pub fn compile(&self, options: &ExportOptions) -> EditResult<CompiledInstruction> {
        compiler::compile(&self.build_spec(options)?)
    }

    /// Compile and start an export.
    ///
    /// Compilation failures are refused before the engine is touched, and a
    /// second export cannot start while one is running. Progress and
    /// completion callbacks from arbitrary threads are funneled through one
    /// writer that publishes to [`events`](Self::events) and feeds the
    /// returned single-consumer stream.
    pub async fn export(&mut self, options: &ExportOptions) -> EditResult<ExportJob> {
        let spec = self.build_spec(options)?;
        let instruction = compiler::compile(&spec)?;

        if self.exporting.swap(true, Ordering::SeqCst) {
            return Err(EditError::Execution {
                message: "an export is already running".to_string(),
            });
        }
        self.engine.begin_export();

        let total = spec.total_output_seconds();
        let (tx, mut raw_rx) = mpsc::unbounded_channel();
        let (job_tx, job_rx) = mpsc::unbounded_channel();

        // The sole writer of UI-facing state: relays each funneled event,
        // then forwards it to the job stream
        let relay = self.events.clone();
        tokio::spawn(async move {
            while let Some(event) = raw_rx.recv().await {
                relay.publish(event);
                let _ = job_tx.send(event);
            }
        });

        let progress_tx = tx.clone();
        let on_progress = Arc::new(move |elapsed: f64| {
            let fraction = if total > 0.0 {
                (elapsed / total).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let _ = progress_tx.send(ExportEvent::Progress {
                fraction,
                elapsed_seconds: elapsed,
            });
        });

        let exporting = Arc::clone(&self.exporting);
        let on_complete = Arc::new(move |success: bool| {
            exporting.store(false, Ordering::SeqCst);
            if !success {
                warn!("export did not complete successfully");
            }
            let _ = tx.send(ExportEvent::Completed { success });
        });

        let handle = match self
            .executor
            .execute(&instruction, on_progress, on_complete)
            .await
        {
            Ok(handle) => handle,
            Err(error) => {
                self.exporting.store(false, Ordering::SeqCst);
                self.engine.end_export();
                return Err(error);
            }
        };

        info!(output = %spec.output_path.display(), "export started");
        Ok(ExportJob {
            handle,
            events: job_rx,
        })
    }

    /// Acknowledge a completed export, releasing the timeline for editing.
    /// Call after observing [`ExportEvent::Completed`].
    pub fn finish_export(&mut self) {
        self.exporting.store(false, Ordering::SeqCst);
        self.engine.end_export();
    }
}
