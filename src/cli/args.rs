//! Command line argument definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "cutline",
    version,
    about = "Trim, re-time, and re-encode video from the command line",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as line-delimited JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trim and transcode a source file
    Export(ExportArgs),
    /// Probe a media file and print its properties
    Inspect(InspectArgs),
    /// Render an evenly spaced thumbnail strip
    Thumbs(ThumbsArgs),
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Source media file
    pub input: PathBuf,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Clip to keep, as START,END (seconds or H:MM:SS.ff). Repeatable;
    /// clips concatenate in the order given. Omitting keeps everything.
    #[arg(long = "clip", value_name = "START,END")]
    pub clips: Vec<String>,

    /// Playback speed multiplier
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,

    /// Target resolution: a preset label (e.g. 720p) or WIDTHxHEIGHT
    #[arg(long)]
    pub resolution: Option<String>,

    /// Output frame rate
    #[arg(long)]
    pub fps: Option<f64>,

    /// Audio track to keep, by probe order starting at 1 (0 disables audio)
    #[arg(long)]
    pub audio_track: Option<usize>,

    /// Container format (mp4, mkv, mov, webm, gif); inferred from the
    /// output extension when omitted
    #[arg(long)]
    pub format: Option<String>,

    /// Video codec override
    #[arg(long)]
    pub video_codec: Option<String>,

    /// Audio codec override
    #[arg(long)]
    pub audio_codec: Option<String>,

    /// Print the compiled engine invocation instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct ThumbsArgs {
    /// Source media file
    pub input: PathBuf,

    /// Directory to write thumbnails into
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Number of thumbnails across the timeline
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Media file to probe
    pub input: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
