//! Export pipeline compiler
//!
//! Turns a declarative [`ExportSpec`] into the linear instruction sequence
//! the transcoding engine executes: timed inputs, a filter graph with
//! correctly ordered tag wiring, stream mappings, and codec flags.
//! Compilation is a pure function; identical specs yield byte-identical
//! token lists, and every validation failure is refused before a single
//! instruction is emitted.

pub mod filtergraph;

use tracing::debug;

use crate::domain::errors::{EditError, EditResult};
use crate::domain::model::ExportSpec;

pub use filtergraph::{bracket, final_audio_tag, FilterGraph, FilterStage, FINAL_VIDEO_TAG};

/// The compiled form of one export attempt.
///
/// `inputs` holds the tokens up to and including the `-i` reads; `outputs`
/// holds mapping, codec, and destination tokens. The filter graph sits
/// between them on the final command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledInstruction {
    inputs: Vec<String>,
    filter_graph: FilterGraph,
    outputs: Vec<String>,
}

impl CompiledInstruction {
    pub fn filter_graph(&self) -> &FilterGraph {
        &self.filter_graph
    }

    /// The full ordered token list handed to the transcoding engine
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = self.inputs.clone();
        if !self.filter_graph.is_empty() {
            tokens.push("-filter_complex".to_string());
            tokens.push(self.filter_graph.render());
        }
        tokens.extend(self.outputs.iter().cloned());
        tokens
    }
}

/// Compile an export spec into a transcoding instruction sequence.
///
/// Fails with `UnresolvedSource` when the input path is not readable, and
/// with `EmptyExport` when the speed-adjusted output duration is zero.
pub fn compile(spec: &ExportSpec) -> EditResult<CompiledInstruction> {
    if spec.source.path.as_os_str().is_empty() || !spec.source.path.is_file() {
        return Err(EditError::UnresolvedSource {
            path: spec.source.path.to_string_lossy().to_string(),
        });
    }

    let clips = spec.effective_clips();
    if spec.total_output_seconds() <= 0.0 {
        return Err(EditError::EmptyExport);
    }

    let n = clips.len();
    // A format without audio capability silences every audio emission step.
    // Each selected track contributes its own sub-track index; output audio
    // streams are numbered by selection order.
    let audio_ids: Vec<i32> = if spec.container.supports_audio() {
        spec.audio_tracks.iter().map(|t| t.stream_id).collect()
    } else {
        Vec::new()
    };
    let audio_track_count = audio_ids.len();

    debug!(
        clips = n,
        audio_tracks = audio_track_count,
        speed = spec.speed,
        "compiling export spec"
    );

    // 1. Input stage allocation: one timed read per clip against the same
    // source, so downstream concatenation gets independently seekable
    // streams.
    let path = spec.source.path.to_string_lossy().to_string();
    let mut inputs = vec!["-y".to_string()];
    for clip in &clips {
        inputs.push("-ss".to_string());
        inputs.push(format_seconds(clip.start().as_seconds()));
        inputs.push("-to".to_string());
        inputs.push(format_seconds(clip.end().as_seconds()));
        inputs.push("-i".to_string());
        inputs.push(path.clone());
    }

    // 2./3. Tag assignment and filter construction, always concat -> scale
    // -> speed. Concat must run first so later per-stream filters see one
    // continuous timeline.
    let mut graph = FilterGraph::new();
    let mut video_tag = bracket("0:v");
    let mut audio_tags: Vec<String> = audio_ids
        .iter()
        .map(|id| bracket(&format!("0:a:{}", id)))
        .collect();
    let mut video_filtered = false;
    let mut audio_filtered = false;

    if n > 1 {
        let mut expr = String::new();
        for i in 0..n {
            expr.push_str(&bracket(&format!("{}:v", i)));
            for id in &audio_ids {
                expr.push_str(&bracket(&format!("{}:a:{}", i, id)));
            }
        }
        expr.push_str(&format!("concat=n={}:v=1", n));
        if audio_track_count > 0 {
            expr.push_str(&format!(":a={}", audio_track_count));
        }
        let mut outs = vec![FINAL_VIDEO_TAG.to_string()];
        expr.push_str(&bracket(FINAL_VIDEO_TAG));
        for k in 0..audio_track_count {
            let tag = final_audio_tag(k);
            expr.push_str(&bracket(&tag));
            outs.push(tag);
        }
        graph.push(FilterStage::Concat, expr, &outs);

        video_tag = bracket(FINAL_VIDEO_TAG);
        audio_tags = (0..audio_track_count)
            .map(|k| bracket(&final_audio_tag(k)))
            .collect();
        video_filtered = true;
        audio_filtered = true;
    }

    if let Some((width, height)) = spec.resolved_dimensions() {
        let expr = format!(
            "{}scale={}:{}{}",
            video_tag,
            width,
            height,
            bracket(FINAL_VIDEO_TAG)
        );
        graph.push(FilterStage::Scale, expr, &[FINAL_VIDEO_TAG.to_string()]);
        video_tag = bracket(FINAL_VIDEO_TAG);
        video_filtered = true;
    }

    if spec.speed != 1.0 {
        let expr = format!(
            "{}setpts=PTS/{}{}",
            video_tag,
            format_factor(spec.speed),
            bracket(FINAL_VIDEO_TAG)
        );
        graph.push(FilterStage::Setpts, expr, &[FINAL_VIDEO_TAG.to_string()]);
        video_tag = bracket(FINAL_VIDEO_TAG);
        video_filtered = true;

        for k in 0..audio_track_count {
            let out = final_audio_tag(k);
            let expr = format!(
                "{}atempo={}{}",
                audio_tags[k],
                format_factor(spec.speed),
                bracket(&out)
            );
            graph.push(FilterStage::Atempo(k), expr, &[out.clone()]);
            audio_tags[k] = bracket(&out);
        }
        audio_filtered = true;
    }

    // 4. Mapping: video, then audio per sub-track, then metadata copies,
    // then chapter stripping (the output never inherits source chapters).
    let mut outputs = Vec::new();
    outputs.push("-map".to_string());
    outputs.push(if video_filtered {
        video_tag
    } else {
        "0:v:0".to_string()
    });
    for (k, tag) in audio_tags.iter().enumerate() {
        outputs.push("-map".to_string());
        outputs.push(if audio_filtered {
            tag.clone()
        } else {
            format!("0:a:{}", audio_ids[k])
        });
    }
    for (k, id) in audio_ids.iter().enumerate() {
        outputs.push(format!("-map_metadata:s:a:{}", k));
        outputs.push(format!("0:s:a:{}", id));
    }
    outputs.push("-map_chapters".to_string());
    outputs.push("-1".to_string());

    // 5. Codec, bitrate, and frame-rate instructions
    if let Some(video_codec) = &spec.video_codec {
        outputs.push("-c:v".to_string());
        outputs.push(video_codec.clone());
        if let Some(bitrate) = spec.source.video_bitrate {
            outputs.push("-b:v".to_string());
            outputs.push(bitrate.to_string());
        }
    }
    if audio_track_count > 0 {
        if let Some(audio_codec) = &spec.audio_codec {
            outputs.push("-c:a".to_string());
            outputs.push(audio_codec.clone());
            if let Some(bitrate) = spec.audio_tracks[0].bitrate {
                outputs.push("-b:a".to_string());
                outputs.push(format!("{}", bitrate.round() as u64));
            }
        }
    }
    if let Some(rate) = spec.frame_rate {
        outputs.push("-r".to_string());
        outputs.push(format_factor(rate));
    }

    // 6. Output path last
    outputs.push(spec.output_path.to_string_lossy().to_string());

    Ok(CompiledInstruction {
        inputs,
        filter_graph: graph,
        outputs,
    })
}

// Fixed-precision seconds so identical specs render identical tokens
fn format_seconds(seconds: f64) -> String {
    format!("{:.6}", seconds)
}

// Speed and frame-rate factors print without a forced decimal tail
fn format_factor(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
