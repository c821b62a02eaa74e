// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::errors::EditError;

/// Non-negative time in seconds with fractional precision.
///
/// Arithmetic saturates at zero; a `TimeInterval` can never go negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TimeInterval {
    seconds: f64,
}

impl TimeInterval {
    pub const ZERO: TimeInterval = TimeInterval { seconds: 0.0 };

    /// Create a new TimeInterval from seconds, clamping negatives to zero
    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            seconds: if seconds.is_finite() { seconds.max(0.0) } else { 0.0 },
        }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Subtraction saturating at zero
    pub fn saturating_sub(&self, other: TimeInterval) -> TimeInterval {
        Self::from_seconds(self.seconds - other.seconds)
    }

    /// Parse a time string: `HH:MM:SS.ffffff`, `MM:SS.ff`, or plain seconds
    pub fn parse(time_str: &str) -> Result<Self, EditError> {
        let trimmed = time_str.trim();
        let bad = || EditError::Parse {
            text: time_str.to_string(),
        };

        // Plain seconds (float)
        if let Ok(seconds) = trimmed.parse::<f64>() {
            if seconds < 0.0 || !seconds.is_finite() {
                return Err(bad());
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.len() {
            2 => {
                // MM:SS.ff
                let minutes = parts[0].parse::<u32>().map_err(|_| bad())?;
                let seconds = parts[1].parse::<f64>().map_err(|_| bad())?;
                if !(0.0..60.0).contains(&seconds) {
                    return Err(bad());
                }
                Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
            }
            3 => {
                // HH:MM:SS.ffffff
                let hours = parts[0].parse::<u32>().map_err(|_| bad())?;
                let minutes = parts[1].parse::<u32>().map_err(|_| bad())?;
                let seconds = parts[2].parse::<f64>().map_err(|_| bad())?;
                if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
                    return Err(bad());
                }
                Ok(Self::from_seconds(
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
                ))
            }
            _ => Err(bad()),
        }
    }

    /// Format as H:MM:SS.mmm (or M:SS.mmm below one hour)
    pub fn format_hms(&self) -> String {
        // Round once at millisecond precision so the carry propagates
        // through seconds and minutes
        let total_millis = (self.seconds * 1000.0).round() as u64;
        let millis = total_millis % 1000;
        let total_seconds = total_millis / 1000;
        let seconds = total_seconds % 60;
        let minutes = (total_seconds / 60) % 60;
        let hours = total_seconds / 3600;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
        } else {
            format!("{}:{:02}.{:03}", minutes, seconds, millis)
        }
    }
}

impl std::ops::Add for TimeInterval {
    type Output = TimeInterval;

    fn add(self, rhs: TimeInterval) -> TimeInterval {
        TimeInterval::from_seconds(self.seconds + rhs.seconds)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// A validated time span with `start < end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: TimeInterval,
    pub end: TimeInterval,
}

impl TimeRange {
    /// Create a new range; fails unless `start < end`
    pub fn new(start: TimeInterval, end: TimeInterval) -> Result<Self, EditError> {
        if start >= end {
            return Err(EditError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> TimeInterval {
        self.end.saturating_sub(self.start)
    }

    pub fn mid(&self) -> TimeInterval {
        TimeInterval::from_seconds((self.start.as_seconds() + self.end.as_seconds()) / 2.0)
    }
}

/// A normalized position, conventionally in [0, 1].
///
/// Values may momentarily sit outside that range (drag offsets, raw pixel
/// conversions) but every state mutator clamps before storage.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(pub f64);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0.0);
    pub const ONE: Ratio = Ratio(1.0);

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Clamp to [0, 1]
    pub fn clamped_unit(&self) -> Ratio {
        self.clamped(0.0, 1.0)
    }

    /// Clamp to an arbitrary sub-range
    pub fn clamped(&self, lo: f64, hi: f64) -> Ratio {
        if !self.0.is_finite() {
            return Ratio(lo);
        }
        Ratio(self.0.clamp(lo, hi))
    }
}

/// The full playable bounds of the loaded media.
///
/// Set once per media load; all ratios in the coordinate engine are relative
/// to these limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineLimits {
    pub start: TimeInterval,
    pub end: TimeInterval,
}

impl TimelineLimits {
    pub fn new(start: TimeInterval, end: TimeInterval) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> TimeInterval {
        self.end.saturating_sub(self.start)
    }

    /// Absolute time at a normalized position over the full range
    pub fn time_at(&self, ratio: Ratio) -> TimeInterval {
        let r = ratio.clamped_unit().value();
        TimeInterval::from_seconds(self.start.as_seconds() + self.duration().as_seconds() * r)
    }

    /// Normalized position of an absolute time; zero-width limits yield 0
    pub fn ratio_of(&self, time: TimeInterval) -> Ratio {
        let width = self.duration().as_seconds();
        if width <= 0.0 {
            return Ratio::ZERO;
        }
        Ratio((time.as_seconds() - self.start.as_seconds()) / width).clamped_unit()
    }
}

/// The active trim window as a pair of ratios over the timeline limits.
///
/// Invariant `0 <= start_ratio <= end_ratio <= 1`, re-established by every
/// mutator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimRange {
    start_ratio: Ratio,
    end_ratio: Ratio,
}

impl TrimRange {
    /// The whole-media trim window, 0..1
    pub fn full() -> Self {
        Self {
            start_ratio: Ratio::ZERO,
            end_ratio: Ratio::ONE,
        }
    }

    pub fn new(start: Ratio, end: Ratio) -> Self {
        let start = start.clamped_unit();
        let end = end.clamped(start.value(), 1.0);
        Self {
            start_ratio: start,
            end_ratio: end,
        }
    }

    pub fn start_ratio(&self) -> Ratio {
        self.start_ratio
    }

    pub fn end_ratio(&self) -> Ratio {
        self.end_ratio
    }

    /// Width of the trimmed window in ratio space
    pub fn interval(&self) -> f64 {
        self.end_ratio.value() - self.start_ratio.value()
    }

    /// Move the start handle, clamped to [0, end]
    pub fn set_start(&mut self, ratio: Ratio) {
        self.start_ratio = ratio.clamped(0.0, self.end_ratio.value());
    }

    /// Move the end handle, clamped to [start, 1]
    pub fn set_end(&mut self, ratio: Ratio) {
        self.end_ratio = ratio.clamped(self.start_ratio.value(), 1.0);
    }

    /// Rigid translation preserving the interval, clamped so neither bound
    /// leaves [0, 1]
    pub fn shift(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        let interval = self.interval();
        let shifted = (self.start_ratio.value() + delta).clamp(0.0, 1.0 - interval);
        self.start_ratio = Ratio(shifted);
        self.end_ratio = Ratio(shifted + interval);
    }
}

/// An immutable time sub-range of the source media selected for export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    start: TimeInterval,
    end: TimeInterval,
}

impl Clip {
    /// Create a clip; fails unless `start < end`
    pub fn new(start: TimeInterval, end: TimeInterval) -> Result<Self, EditError> {
        let range = TimeRange::new(start, end)?;
        Ok(Self {
            start: range.start,
            end: range.end,
        })
    }

    /// Derive a clip from the trim window over the media limits
    pub fn from_trim(trim: &TrimRange, limits: &TimelineLimits) -> Result<Self, EditError> {
        Self::new(
            limits.time_at(trim.start_ratio()),
            limits.time_at(trim.end_ratio()),
        )
    }

    pub fn start(&self) -> TimeInterval {
        self.start
    }

    pub fn end(&self) -> TimeInterval {
        self.end
    }

    pub fn duration(&self) -> TimeInterval {
        self.end.saturating_sub(self.start)
    }
}

/// Descriptor for one selectable audio or subtitle track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub stream_id: i32,
    pub title_id: i32,
    pub title: Option<String>,
    pub language: Option<String>,
    pub bitrate: Option<f64>,
}

impl TrackDescriptor {
    /// The "disabled" sentinel. Always listed first when a selector allows
    /// turning a track off.
    pub fn disabled() -> Self {
        Self {
            stream_id: -1,
            title_id: -1,
            title: None,
            language: None,
            bitrate: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.stream_id >= 0
    }
}

/// Target output resolution.
///
/// Identity is width/height only; the display label carried for UI purposes
/// does not participate in equality.
#[derive(Debug, Clone)]
pub struct ResolutionSpec {
    pub width: i32,
    pub height: i32,
    pub label: Option<String>,
}

impl ResolutionSpec {
    /// Sentinel meaning "user supplies explicit dimensions"
    pub const CUSTOM: ResolutionSpec = ResolutionSpec {
        width: i32::MIN,
        height: i32::MIN,
        label: None,
    };

    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            label: None,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.width == i32::MIN && self.height == i32::MIN
    }

    /// The fixed scale table presented to the user
    pub fn presets() -> Vec<ResolutionSpec> {
        [
            (3840, 2160, "2160p"),
            (2560, 1440, "1440p"),
            (1920, 1080, "1080p"),
            (1280, 720, "720p"),
            (854, 480, "480p"),
            (640, 360, "360p"),
        ]
        .into_iter()
        .map(|(w, h, label)| ResolutionSpec {
            width: w,
            height: h,
            label: Some(label.to_string()),
        })
        .collect()
    }
}

impl PartialEq for ResolutionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Output container format.
///
/// `supports_audio` is the single switch that gates every audio-related
/// emission step in the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Mp4,
    Mkv,
    Mov,
    Webm,
    Gif,
}

impl ContainerFormat {
    pub fn parse(name: &str) -> Result<Self, EditError> {
        match name.to_lowercase().as_str() {
            "mp4" => Ok(ContainerFormat::Mp4),
            "mkv" => Ok(ContainerFormat::Mkv),
            "mov" => Ok(ContainerFormat::Mov),
            "webm" => Ok(ContainerFormat::Webm),
            "gif" => Ok(ContainerFormat::Gif),
            _ => Err(EditError::Parse {
                text: name.to_string(),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Mkv => "mkv",
            ContainerFormat::Mov => "mov",
            ContainerFormat::Webm => "webm",
            ContainerFormat::Gif => "gif",
        }
    }

    /// Whether the container can carry audio streams at all
    pub fn supports_audio(&self) -> bool {
        !matches!(self, ContainerFormat::Gif)
    }

    /// Recommended (video, audio) codecs for the format
    pub fn default_codecs(&self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            ContainerFormat::Mp4 | ContainerFormat::Mov => (Some("libx264"), Some("aac")),
            ContainerFormat::Mkv => (Some("libx264"), Some("aac")),
            ContainerFormat::Webm => (Some("libvpx-vp9"), Some("libopus")),
            ContainerFormat::Gif => (None, None),
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A resolved input media handle with probed properties
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub path: PathBuf,
    pub duration: TimeInterval,
    pub start_offset: TimeInterval,
    pub video_bitrate: Option<u64>,
}

impl MediaSource {
    pub fn new(path: impl Into<PathBuf>, duration: TimeInterval) -> Self {
        Self {
            path: path.into(),
            duration,
            start_offset: TimeInterval::ZERO,
            video_bitrate: None,
        }
    }

    /// The full playable range of this source
    pub fn full_range(&self) -> TimelineLimits {
        TimelineLimits::new(self.start_offset, self.start_offset + self.duration)
    }
}

/// A complete declarative edit specification, created fresh per export
/// attempt and immutable once compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpec {
    pub source: MediaSource,
    pub clips: Vec<Clip>,
    pub speed: f64,
    pub resolution: Option<ResolutionSpec>,
    pub custom_size: Option<(u32, u32)>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub frame_rate: Option<f64>,
    pub audio_tracks: Vec<TrackDescriptor>,
    pub output_path: PathBuf,
    pub container: ContainerFormat,
}

impl ExportSpec {
    /// Validate and build a spec. The speed multiplier must be positive and
    /// the custom resolution sentinel requires explicit dimensions.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: MediaSource,
        clips: Vec<Clip>,
        speed: f64,
        resolution: Option<ResolutionSpec>,
        custom_size: Option<(u32, u32)>,
        video_codec: Option<String>,
        audio_codec: Option<String>,
        frame_rate: Option<f64>,
        audio_tracks: Vec<TrackDescriptor>,
        output_path: impl Into<PathBuf>,
        container: ContainerFormat,
    ) -> Result<Self, EditError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(EditError::Parse {
                text: format!("speed multiplier {}", speed),
            });
        }
        if let Some(res) = &resolution {
            if res.is_custom() && custom_size.is_none() {
                return Err(EditError::Parse {
                    text: "custom resolution without explicit dimensions".to_string(),
                });
            }
        }
        Ok(Self {
            source,
            clips,
            speed,
            resolution,
            custom_size,
            video_codec,
            audio_codec,
            frame_rate,
            // The disabled sentinel never reaches the compiler
            audio_tracks: audio_tracks.into_iter().filter(|t| t.is_enabled()).collect(),
            output_path: output_path.into(),
            container,
        })
    }

    /// The clips to export: the user's ordered list, or the whole source
    /// range when the list is empty
    pub fn effective_clips(&self) -> Vec<Clip> {
        if !self.clips.is_empty() {
            return self.clips.clone();
        }
        let limits = self.source.full_range();
        match Clip::new(limits.start, limits.end) {
            Ok(clip) => vec![clip],
            Err(_) => Vec::new(),
        }
    }

    /// Total output duration in seconds after speed adjustment
    pub fn total_output_seconds(&self) -> f64 {
        self.effective_clips()
            .iter()
            .map(|c| c.duration().as_seconds() / self.speed)
            .sum()
    }

    /// Resolved target dimensions, honoring the custom sentinel
    pub fn resolved_dimensions(&self) -> Option<(i64, i64)> {
        let res = self.resolution.as_ref()?;
        if res.is_custom() {
            self.custom_size.map(|(w, h)| (w as i64, h as i64))
        } else {
            Some((res.width as i64, res.height as i64))
        }
    }
}

#[cfg(test)]
mod tests;
