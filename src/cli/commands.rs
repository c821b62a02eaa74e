//! Command implementations

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tracing::info;

use crate::adapters::{FfmpegExecutor, FfmpegThumbnailer, FfprobeAdapter, TomlPrefsStore};
use crate::cli::args::{ExportArgs, InspectArgs, ThumbsArgs};
use crate::domain::model::{
    Clip, ContainerFormat, ResolutionSpec, TimeInterval, TimelineLimits, TrackDescriptor,
};
use crate::ports::{PrefsStore, ProbePort};
use crate::session::{EditSession, ExportEvent, ExportOptions};
use crate::thumbs;

// The CLI has no real viewport; any nonzero width works since nothing here
// converts pixels.
const HEADLESS_VIEWPORT: f64 = 1000.0;

pub async fn run_export(args: ExportArgs) -> Result<()> {
    let prefs_store = default_prefs_store();
    let container = resolve_container(&args, prefs_store.as_ref())?;
    let (resolution, custom_size) = match &args.resolution {
        Some(text) => parse_resolution(text)?,
        None => (None, None),
    };

    let mut session = EditSession::new(
        Arc::new(FfprobeAdapter::new()),
        Arc::new(FfmpegExecutor::new()),
        HEADLESS_VIEWPORT,
    );
    session
        .load_media(&args.input)
        .await
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    for text in &args.clips {
        let clip = parse_clip(text)?;
        session.clips_mut().add(clip);
    }
    if let Some(index) = args.audio_track {
        session.select_audio_track(index);
    }

    let options = ExportOptions {
        speed: args.speed,
        resolution,
        custom_size,
        video_codec: args.video_codec.clone(),
        audio_codec: args.audio_codec.clone(),
        frame_rate: args.fps,
        container,
        output_path: args.output.clone(),
    };

    if args.dry_run {
        let instruction = session.compile(&options)?;
        println!("ffmpeg {}", instruction.tokens().join(" "));
        return Ok(());
    }

    let mut job = session.export(&options).await?;
    let success = loop {
        tokio::select! {
            event = job.events.recv() => match event {
                Some(ExportEvent::Progress { fraction, elapsed_seconds }) => {
                    eprint!("\rexporting: {:5.1}% ({:.1}s)", fraction * 100.0, elapsed_seconds);
                }
                Some(ExportEvent::Completed { success }) => break success,
                None => break false,
            },
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\ncancelling export");
                job.handle.cancel();
            }
        }
    };
    eprintln!();
    session.finish_export();

    if !success {
        bail!("export failed");
    }
    remember_container(prefs_store.as_ref(), container);
    info!(output = %args.output.display(), "export finished");
    println!("wrote {}", args.output.display());
    Ok(())
}

pub async fn run_thumbs(args: ThumbsArgs) -> Result<()> {
    let probe = FfprobeAdapter::new();
    let report = probe.probe(&args.input).await?;
    let duration = report
        .duration
        .ok_or_else(|| anyhow!("no duration reported for {}", args.input.display()))?;
    let start = report.start_offset.unwrap_or(TimeInterval::ZERO);
    let limits = TimelineLimits::new(start, start + duration);

    let strip = thumbs::render_strip(
        Arc::new(FfmpegThumbnailer::new()),
        args.input.clone(),
        limits,
        args.count,
    )
    .await;

    std::fs::create_dir_all(&args.output_dir)?;
    for (index, bytes) in &strip {
        let path = args.output_dir.join(format!("thumb_{:03}.jpg", index));
        std::fs::write(&path, bytes)?;
    }
    println!(
        "wrote {} of {} thumbnails to {}",
        strip.len(),
        args.count,
        args.output_dir.display()
    );
    Ok(())
}

// ~/.config/cutline/prefs.toml; absent HOME just skips persistence
fn default_prefs_store() -> Option<TomlPrefsStore> {
    let home = std::env::var_os("HOME")?;
    let path = std::path::PathBuf::from(home)
        .join(".config")
        .join("cutline")
        .join("prefs.toml");
    Some(TomlPrefsStore::new(path))
}

fn remember_container(store: Option<&TomlPrefsStore>, container: ContainerFormat) {
    let Some(store) = store else { return };
    let mut prefs = store.load().unwrap_or_default();
    prefs.last_container = Some(container.extension().to_string());
    if let Err(error) = store.save(&prefs) {
        tracing::debug!(%error, "could not persist preferences");
    }
}

pub async fn run_inspect(args: InspectArgs) -> Result<()> {
    let probe = FfprobeAdapter::new();
    let report = probe.probe(&args.input).await?;

    let view = InspectReport {
        path: args.input.display().to_string(),
        duration_seconds: report.duration.map(|d| d.as_seconds()),
        start_offset_seconds: report.start_offset.map(|d| d.as_seconds()),
        resolution: report.resolution,
        video_bitrate: report.video_bitrate,
        audio_tracks: report.audio_tracks,
        subtitle_tracks: report.subtitle_tracks,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", view.path);
    match view.duration_seconds {
        Some(seconds) => println!(
            "  duration:   {}",
            TimeInterval::from_seconds(seconds).format_hms()
        ),
        None => println!("  duration:   unknown"),
    }
    if let Some((width, height)) = view.resolution {
        println!("  resolution: {}x{}", width, height);
    }
    if let Some(bitrate) = view.video_bitrate {
        println!("  bitrate:    {} b/s", bitrate);
    }
    for (i, track) in view.audio_tracks.iter().enumerate() {
        println!("  audio {}:    {}", i + 1, describe_track(track));
    }
    for (i, track) in view.subtitle_tracks.iter().enumerate() {
        println!("  subtitle {}: {}", i + 1, describe_track(track));
    }
    Ok(())
}

#[derive(Serialize)]
struct InspectReport {
    path: String,
    duration_seconds: Option<f64>,
    start_offset_seconds: Option<f64>,
    resolution: Option<(u32, u32)>,
    video_bitrate: Option<u64>,
    audio_tracks: Vec<TrackDescriptor>,
    subtitle_tracks: Vec<TrackDescriptor>,
}

fn describe_track(track: &TrackDescriptor) -> String {
    match (&track.title, &track.language) {
        (Some(title), Some(language)) => format!("{} [{}]", title, language),
        (Some(title), None) => title.clone(),
        (None, Some(language)) => language.clone(),
        (None, None) => format!("track #{}", track.title_id),
    }
}

// --format wins, then the output extension, then the container remembered
// from the previous export
fn resolve_container(
    args: &ExportArgs,
    prefs_store: Option<&TomlPrefsStore>,
) -> Result<ContainerFormat> {
    if let Some(name) = &args.format {
        return ContainerFormat::parse(name).map_err(Into::into);
    }
    if let Some(extension) = args.output.extension().and_then(|e| e.to_str()) {
        return ContainerFormat::parse(extension)
            .map_err(|_| anyhow!("unsupported output container .{}", extension));
    }
    if let Some(store) = prefs_store {
        if let Some(name) = store.load().unwrap_or_default().last_container {
            return ContainerFormat::parse(&name).map_err(Into::into);
        }
    }
    Err(anyhow!(
        "cannot infer container from {}; pass --format",
        args.output.display()
    ))
}

// START,END with either side in seconds or clock notation
fn parse_clip(text: &str) -> Result<Clip> {
    let (start, end) = text
        .split_once(',')
        .ok_or_else(|| anyhow!("clip {:?} is not START,END", text))?;
    let clip = Clip::new(TimeInterval::parse(start)?, TimeInterval::parse(end)?)?;
    Ok(clip)
}

fn parse_resolution(text: &str) -> Result<(Option<ResolutionSpec>, Option<(u32, u32)>)> {
    let lowered = text.to_lowercase();
    if let Some(preset) = ResolutionSpec::presets()
        .into_iter()
        .find(|p| p.label.as_deref() == Some(lowered.as_str()))
    {
        return Ok((Some(preset), None));
    }
    let (w, h) = lowered
        .split_once('x')
        .ok_or_else(|| anyhow!("resolution {:?} is neither a preset nor WIDTHxHEIGHT", text))?;
    let width: u32 = w.parse().context("bad resolution width")?;
    let height: u32 = h.parse().context("bad resolution height")?;
    if width == 0 || height == 0 {
        bail!("resolution dimensions must be nonzero");
    }
    Ok((Some(ResolutionSpec::CUSTOM), Some((width, height))))
}
