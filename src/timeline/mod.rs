//! Timeline coordinate engine
//!
//! Single source of truth for the trim handles and the scrub indicator,
//! expressed as ratios over the loaded media's limits. Converts between
//! ratio space, absolute-time space, and pixel space, and emits playback
//! commands instead of reading live player state, so the player's own
//! position feedback can never re-enter the trim-ratio state.

use tracing::debug;

use crate::domain::model::{Clip, Ratio, TimeInterval, TimelineLimits, TrimRange};

/// Default trim-handle width in pixels
pub const DEFAULT_HANDLE_WIDTH: f64 = 10.0;

/// Phase of a scrubber drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubPhase {
    Began,
    Moved,
    Ended,
}

/// Command for the external playback engine.
///
/// `Seek` carries the absolute ratio over the full media range; it is the
/// only position value pushed outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    Pause,
    Resume,
    Seek(Ratio),
}

/// Explicit scrub/export state machine.
///
/// The resume decision at drag-end consults the snapshot captured at
/// drag-begin, never the live play flag, so a racing pause request cannot
/// flip the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubState {
    Idle,
    Scrubbing { resume_on_release: bool },
    Exporting,
}

/// The timeline coordinate engine
#[derive(Debug, Clone)]
pub struct TimelineEngine {
    limits: TimelineLimits,
    trim: TrimRange,
    /// Playback position relative to the trimmed window: 0 = trim start,
    /// 1 = trim end
    playback_ratio: Ratio,
    viewport_width: f64,
    handle_width: f64,
    playing: bool,
    state: ScrubState,
    start_text: String,
    end_text: String,
}

impl TimelineEngine {
    pub fn new(viewport_width: f64) -> Self {
        let limits = TimelineLimits::new(TimeInterval::ZERO, TimeInterval::ZERO);
        let mut engine = Self {
            limits,
            trim: TrimRange::full(),
            playback_ratio: Ratio::ZERO,
            viewport_width,
            handle_width: DEFAULT_HANDLE_WIDTH,
            playing: false,
            state: ScrubState::Idle,
            start_text: String::new(),
            end_text: String::new(),
        };
        engine.refresh_texts();
        engine
    }

    /// Load new media. Resets the trim window to the whole range and the
    /// playback position to the trim start.
    pub fn set_media(&mut self, limits: TimelineLimits) {
        self.limits = limits;
        self.trim = TrimRange::full();
        self.playback_ratio = Ratio::ZERO;
        self.state = ScrubState::Idle;
        self.refresh_texts();
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width.max(0.0);
    }

    pub fn trim_range(&self) -> TrimRange {
        self.trim
    }

    pub fn playback_ratio(&self) -> Ratio {
        self.playback_ratio
    }

    pub fn state(&self) -> ScrubState {
        self.state
    }

    pub fn start_time_text(&self) -> &str {
        &self.start_text
    }

    pub fn end_time_text(&self) -> &str {
        &self.end_text
    }

    /// Absolute time at the trim start
    pub fn trim_start_time(&self) -> TimeInterval {
        self.limits.time_at(self.trim.start_ratio())
    }

    /// Absolute time at the trim end
    pub fn trim_end_time(&self) -> TimeInterval {
        self.limits.time_at(self.trim.end_ratio())
    }

    /// The clip selected by the current trim window
    pub fn current_clip(&self) -> Result<Clip, crate::domain::errors::EditError> {
        Clip::from_trim(&self.trim, &self.limits)
    }

    /// Move the start handle to a pixel position. Playback rewinds to the
    /// trim start and the player is paused.
    pub fn move_start_handle(&mut self, pixel_x: f64) -> Vec<PlaybackCommand> {
        let ratio = self
            .handle_pixel_to_ratio(pixel_x)
            .clamped(0.0, self.trim.end_ratio().value());
        self.trim.set_start(ratio);
        self.playback_ratio = Ratio::ZERO;
        self.refresh_texts();
        vec![PlaybackCommand::Pause]
    }

    /// Move the end handle to a pixel position. Playback jumps to the trim
    /// end and the player is paused.
    pub fn move_end_handle(&mut self, pixel_x: f64) -> Vec<PlaybackCommand> {
        let ratio = self
            .handle_pixel_to_ratio(pixel_x)
            .clamped(self.trim.start_ratio().value(), 1.0);
        self.trim.set_end(ratio);
        self.playback_ratio = Ratio::ONE;
        self.refresh_texts();
        vec![PlaybackCommand::Pause]
    }

    /// Drag the scrub indicator within the trimmed sub-rectangle.
    ///
    /// Drag-begin snapshots the play state and pauses; drag-end resumes only
    /// if that snapshot was playing. Ignored entirely while an export runs.
    pub fn move_scrubber(&mut self, pixel_x: f64, phase: ScrubPhase) -> Vec<PlaybackCommand> {
        if self.state == ScrubState::Exporting {
            return Vec::new();
        }

        let mut commands = Vec::new();
        match phase {
            ScrubPhase::Began => {
                self.state = ScrubState::Scrubbing {
                    resume_on_release: self.playing,
                };
                commands.push(PlaybackCommand::Pause);
            }
            ScrubPhase::Moved => {}
            ScrubPhase::Ended => {}
        }

        self.playback_ratio = self.scrubber_pixel_to_ratio(pixel_x);
        commands.push(PlaybackCommand::Seek(self.absolute_playback_ratio()));

        if phase == ScrubPhase::Ended {
            if let ScrubState::Scrubbing { resume_on_release } = self.state {
                if resume_on_release {
                    commands.push(PlaybackCommand::Resume);
                }
            }
            self.state = ScrubState::Idle;
        }

        commands
    }

    /// Rigidly translate both handles by the same pixel delta, preserving
    /// the trimmed interval.
    pub fn shift(&mut self, delta_pixels: f64) {
        let usable = self.usable_width();
        if usable <= 0.0 {
            return;
        }
        self.trim.shift(delta_pixels / usable);
        self.refresh_texts();
    }

    /// The playback position as a ratio over the full media range. This is
    /// the only value fed outward to the playback engine.
    pub fn absolute_playback_ratio(&self) -> Ratio {
        Ratio(
            self.trim.start_ratio().value()
                + self.trim.interval() * self.playback_ratio.value(),
        )
        .clamped_unit()
    }

    /// Apply a position report from the playback engine.
    ///
    /// Reports inside the trimmed window update the relative position;
    /// anything outside means playback drifted out of the window, so the
    /// position resets to 0 and the report is otherwise ignored.
    pub fn apply_external_position(&mut self, absolute: Ratio) {
        let start = self.trim.start_ratio().value();
        let end = self.trim.end_ratio().value();
        let abs = absolute.value();
        if abs < start || abs > end {
            self.playback_ratio = Ratio::ZERO;
            return;
        }
        let interval = self.trim.interval();
        self.playback_ratio = if interval <= 0.0 {
            Ratio::ZERO
        } else {
            Ratio((abs - start) / interval).clamped_unit()
        };
    }

    /// Live play-state reports. Does not rewrite a scrub-begin snapshot.
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn begin_export(&mut self) {
        self.state = ScrubState::Exporting;
    }

    pub fn end_export(&mut self) {
        self.state = ScrubState::Idle;
    }

    /// Edit the start time through its text field. Returns the text the
    /// field should display: the canonical form of the accepted value, or
    /// the previous valid text when the input is malformed or out of order.
    pub fn set_start_time(&mut self, text: &str) -> String {
        match TimeInterval::parse(text) {
            Ok(parsed) => {
                let clamped = clamp_time(parsed, self.limits.start, self.limits.end);
                if clamped >= self.trim_end_time() {
                    debug!(input = text, "start time not before end, reverting");
                    return self.start_text.clone();
                }
                self.trim.set_start(self.limits.ratio_of(clamped));
                self.playback_ratio = Ratio::ZERO;
                self.refresh_texts();
                self.start_text.clone()
            }
            Err(_) => {
                debug!(input = text, "unparseable start time, reverting");
                self.start_text.clone()
            }
        }
    }

    /// Text-field counterpart of [`set_start_time`] for the end bound
    pub fn set_end_time(&mut self, text: &str) -> String {
        match TimeInterval::parse(text) {
            Ok(parsed) => {
                let clamped = clamp_time(parsed, self.limits.start, self.limits.end);
                if clamped <= self.trim_start_time() {
                    debug!(input = text, "end time not after start, reverting");
                    return self.end_text.clone();
                }
                self.trim.set_end(self.limits.ratio_of(clamped));
                self.playback_ratio = Ratio::ONE;
                self.refresh_texts();
                self.end_text.clone()
            }
            Err(_) => {
                debug!(input = text, "unparseable end time, reverting");
                self.end_text.clone()
            }
        }
    }

    // Width available to the handles once both handle widths are excluded
    fn usable_width(&self) -> f64 {
        self.viewport_width - 2.0 * self.handle_width
    }

    // Pixel position of a trim handle to a ratio over the full strip.
    // Degenerate viewports convert to ratio 0.
    fn handle_pixel_to_ratio(&self, pixel_x: f64) -> Ratio {
        let usable = self.usable_width();
        if usable <= 0.0 {
            return Ratio::ZERO;
        }
        Ratio((pixel_x - self.handle_width) / usable).clamped_unit()
    }

    // Pixel position within the trimmed sub-rectangle to a ratio in [0, 1]
    fn scrubber_pixel_to_ratio(&self, pixel_x: f64) -> Ratio {
        let trimmed_width = self.viewport_width * self.trim.interval();
        let usable = trimmed_width - 2.0 * self.handle_width;
        if usable <= 0.0 {
            return Ratio::ZERO;
        }
        Ratio((pixel_x - self.handle_width) / usable).clamped_unit()
    }

    fn refresh_texts(&mut self) {
        self.start_text = self.trim_start_time().format_hms();
        self.end_text = self.trim_end_time().format_hms();
    }
}

fn clamp_time(t: TimeInterval, lo: TimeInterval, hi: TimeInterval) -> TimeInterval {
    TimeInterval::from_seconds(t.as_seconds().clamp(lo.as_seconds(), hi.as_seconds()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_100s() -> TimelineEngine {
        let mut engine = TimelineEngine::new(1020.0); // usable width 1000 px
        engine.set_media(TimelineLimits::new(
            TimeInterval::ZERO,
            TimeInterval::from_seconds(100.0),
        ));
        engine
    }

    #[test]
    fn test_set_media_resets_state() {
        let mut engine = engine_100s();
        engine.move_start_handle(300.0);
        engine.set_media(TimelineLimits::new(
            TimeInterval::ZERO,
            TimeInterval::from_seconds(50.0),
        ));
        assert_eq!(engine.trim_range(), TrimRange::full());
        assert_eq!(engine.playback_ratio().value(), 0.0);
    }

    #[test]
    fn test_handle_move_pauses_and_rewinds() {
        let mut engine = engine_100s();
        let commands = engine.move_start_handle(110.0);
        assert_eq!(commands, vec![PlaybackCommand::Pause]);
        assert!((engine.trim_range().start_ratio().value() - 0.1).abs() < 1e-12);
        assert_eq!(engine.playback_ratio().value(), 0.0);

        let commands = engine.move_end_handle(510.0);
        assert_eq!(commands, vec![PlaybackCommand::Pause]);
        assert!((engine.trim_range().end_ratio().value() - 0.5).abs() < 1e-12);
        assert_eq!(engine.playback_ratio().value(), 1.0);
    }

    #[test]
    fn test_handles_cannot_cross() {
        let mut engine = engine_100s();
        engine.move_end_handle(510.0); // end at 0.5
        engine.move_start_handle(810.0); // would be 0.8, clamps to 0.5
        assert_eq!(
            engine.trim_range().start_ratio(),
            engine.trim_range().end_ratio()
        );
    }

    #[test]
    fn test_zero_width_viewport_yields_ratio_zero() {
        let mut engine = TimelineEngine::new(0.0);
        engine.set_media(TimelineLimits::new(
            TimeInterval::ZERO,
            TimeInterval::from_seconds(10.0),
        ));
        engine.move_start_handle(500.0);
        assert_eq!(engine.trim_range().start_ratio().value(), 0.0);
    }

    #[test]
    fn test_scrub_resume_consults_snapshot() {
        let mut engine = engine_100s();
        engine.set_playing(true);

        let commands = engine.move_scrubber(400.0, ScrubPhase::Began);
        assert_eq!(commands[0], PlaybackCommand::Pause);
        assert_eq!(
            engine.state(),
            ScrubState::Scrubbing {
                resume_on_release: true
            }
        );

        // A racing pause report must not flip the snapshot
        engine.set_playing(false);
        let commands = engine.move_scrubber(600.0, ScrubPhase::Ended);
        assert!(commands.contains(&PlaybackCommand::Resume));
        assert_eq!(engine.state(), ScrubState::Idle);
    }

    #[test]
    fn test_scrub_no_resume_when_paused_at_begin() {
        let mut engine = engine_100s();
        engine.set_playing(false);
        engine.move_scrubber(400.0, ScrubPhase::Began);
        let commands = engine.move_scrubber(600.0, ScrubPhase::Ended);
        assert!(!commands.contains(&PlaybackCommand::Resume));
    }

    #[test]
    fn test_scrub_ignored_while_exporting() {
        let mut engine = engine_100s();
        engine.begin_export();
        assert!(engine.move_scrubber(400.0, ScrubPhase::Began).is_empty());
        assert_eq!(engine.state(), ScrubState::Exporting);
        engine.end_export();
        assert_eq!(engine.state(), ScrubState::Idle);
    }

    #[test]
    fn test_external_position_round_trip() {
        let mut engine = engine_100s();
        engine.move_start_handle(110.0); // 0.1
        engine.move_end_handle(510.0); // 0.5
        engine.move_scrubber(200.0, ScrubPhase::Moved);
        let before = engine.playback_ratio().value();

        let absolute = engine.absolute_playback_ratio();
        engine.apply_external_position(absolute);
        assert!((engine.playback_ratio().value() - before).abs() < 1e-9);
    }

    #[test]
    fn test_external_position_outside_window_resets() {
        let mut engine = engine_100s();
        engine.move_start_handle(110.0);
        engine.move_end_handle(510.0);
        engine.move_scrubber(200.0, ScrubPhase::Moved);

        engine.apply_external_position(Ratio(0.8));
        assert_eq!(engine.playback_ratio().value(), 0.0);
    }

    #[test]
    fn test_shift_preserves_interval() {
        let mut engine = engine_100s();
        engine.move_start_handle(110.0);
        engine.move_end_handle(510.0);
        let interval = engine.trim_range().interval();

        engine.shift(200.0); // +0.2 in ratio space
        assert!((engine.trim_range().interval() - interval).abs() < 1e-12);
        assert!((engine.trim_range().start_ratio().value() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_text_edit_accepts_and_clamps() {
        let mut engine = engine_100s();
        let shown = engine.set_start_time("0:10.000");
        assert_eq!(shown, "0:10.000");
        assert!((engine.trim_range().start_ratio().value() - 0.1).abs() < 1e-12);

        // Beyond media end clamps before ratio derivation
        let shown = engine.set_end_time("10:00:00");
        assert_eq!(shown, "1:40.000");
        assert_eq!(engine.trim_range().end_ratio().value(), 1.0);
    }

    #[test]
    fn test_text_edit_reverts_on_garbage() {
        let mut engine = engine_100s();
        engine.set_start_time("0:10.000");
        let shown = engine.set_start_time("not a time");
        assert_eq!(shown, "0:10.000");
        assert!((engine.trim_range().start_ratio().value() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_text_edit_reverts_out_of_order() {
        let mut engine = engine_100s();
        engine.set_end_time("0:50.000");
        let shown = engine.set_start_time("1:00.000"); // after the end bound
        assert_eq!(shown, "0:00.000");
        assert_eq!(engine.trim_range().start_ratio().value(), 0.0);
    }

    #[test]
    fn test_scenario_trim_to_clip() {
        // Limits 0..100s, handles at 0.1 and 0.5 => clip 10s..50s
        let mut engine = engine_100s();
        engine.move_start_handle(110.0);
        engine.move_end_handle(510.0);
        let clip = engine.current_clip().unwrap();
        assert!((clip.start().as_seconds() - 10.0).abs() < 1e-9);
        assert!((clip.end().as_seconds() - 50.0).abs() < 1e-9);
    }
}
