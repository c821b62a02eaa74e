//! Cutline
//!
//! A command-line video trimmer and re-encoder. The timeline coordinate
//! engine keeps trim handles, scrub position, and text-field edits
//! consistent across pixel, ratio, and absolute-time space; the export
//! compiler turns the resulting declarative edit into a deterministic
//! ffmpeg invocation.

pub mod adapters;
pub mod cli;
pub mod clips;
pub mod compiler;
pub mod domain;
pub mod ports;
pub mod relay;
pub mod session;
pub mod thumbs;
pub mod timeline;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{EditError, EditResult};
pub use domain::model::{
    Clip, ContainerFormat, ExportSpec, MediaSource, Ratio, ResolutionSpec, TimeInterval,
    TimelineLimits, TrackDescriptor, TrimRange,
};
pub use session::{EditSession, ExportEvent, ExportOptions};
pub use timeline::{PlaybackCommand, ScrubPhase, ScrubState, TimelineEngine};
