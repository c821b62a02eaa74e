// Adapters - External tool implementations of the ports

pub mod ffmpeg_exec;
pub mod ffprobe;
pub mod prefs;
pub mod thumbnailer;

pub use ffmpeg_exec::FfmpegExecutor;
pub use ffprobe::FfprobeAdapter;
pub use prefs::TomlPrefsStore;
pub use thumbnailer::FfmpegThumbnailer;
